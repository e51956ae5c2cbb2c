pub mod claims_repo;
pub mod entitlement_store;
pub mod identity_repo;
