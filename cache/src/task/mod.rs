//! Background work owned by a cache. Currently only the janitor, which
//! reclaims expired entries nobody reads again.

pub(crate) mod janitor;
