//! Repository traits forming the storage boundary.
//!
//! All access to link and click state goes through these contracts; nothing
//! bypasses them to mutate rows directly.

pub mod click_repository;
pub mod link_repository;

pub use click_repository::ClickRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
