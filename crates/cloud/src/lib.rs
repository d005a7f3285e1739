//! Clients for the services SAIVD talks to over the network: the
//! S3-compatible object store and the external watermarking service.

pub mod cors;
pub mod storage;
pub mod watermark;
