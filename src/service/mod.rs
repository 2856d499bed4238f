pub(crate) mod pages;
pub(crate) mod quiz;
pub(crate) mod resources;
pub(crate) mod upload;
