//! Server-authoritative skill resolution core: catalog, effect tracking,
//! progression gating, and the use-skill execution engine.
//!
//! The transport, persistence, and NPC simulation layers consume this crate
//! through the collaborator traits ([`combat::Combatant`],
//! [`combat::ExperienceAwarder`], [`data::PersistenceSink`],
//! [`combat::Clock`]). All validation failures are reported results with
//! enumerated reasons; nothing here panics across the public contract.

pub mod combat;
pub mod data;
pub mod progression;
