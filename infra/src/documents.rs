use crate::ids::{Entity, Id};

/// Something we can keep in a [`Storage`](crate::persistence::Storage).
pub trait Document: Entity + Clone + Sized {
    fn id(&self) -> &Id<Self>;
}
