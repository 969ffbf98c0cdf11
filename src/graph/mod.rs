pub(crate) mod cache;
pub(crate) mod composite;
pub(crate) mod node;
pub(crate) mod pad;
pub(crate) mod source;
