pub(crate) mod byte_source;
