//! Store backend trait.

use crate::Result;
use crate::models::Entity;

/// Trait for writable entity store backends.
///
/// A backend instance represents one open store. Writes accumulate from
/// open until [`commit`](Self::commit); an uncommitted backend discards
/// its writes when closed.
pub trait StoreBackend: Send {
    /// Writes one entity. The last write for an identifier wins.
    fn write(&mut self, entity: &Entity) -> Result<()>;

    /// Makes all writes since open durable and visible.
    fn commit(&mut self) -> Result<()>;

    /// Closes the backend, releasing its lock on the store root.
    ///
    /// Uncommitted writes are discarded.
    fn close(self: Box<Self>) -> Result<()>;
}
