#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod model {
    pub use sparql_bus_model::*;
}

pub mod common {
    pub use sparql_bus_common::*;
}

pub mod core {
    pub use sparql_bus_core::*;
}

pub mod query {
    pub use sparql_bus_query::*;
}

pub mod physical {
    pub use sparql_bus_physical::*;
}

pub mod http {
    pub use sparql_bus_http::*;
}
