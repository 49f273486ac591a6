pub mod carddav;
pub mod contact;
pub mod error;
pub mod extract;
pub mod ldap;
pub mod mapper;
pub mod pipeline;
pub mod policy;
pub mod reconcile;
