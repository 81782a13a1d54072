use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;
use err_derive::Error;
use log::*;

use crate::documents::Document;
use crate::ids::Id;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error(display = "document already exists: {}", _0)]
    Duplicate(String),
    #[error(display = "no such document: {}", _0)]
    Missing(String),
    #[error(display = "store lock poisoned")]
    Poisoned,
}

/// An ordered collection of documents, looked up by id.
pub trait Storage<D: Document>: Send + Sync {
    fn list(&self) -> Result<Vec<D>>;
    fn find(&self, id: &Id<D>) -> Result<Option<D>>;
    fn append(&self, document: D) -> Result<()>;
    fn replace(&self, document: D) -> Result<()>;
    fn remove(&self, id: &Id<D>) -> Result<Option<D>>;
}

/// Keeps everything in a shared vector; cloning yields another handle onto
/// the same documents.
#[derive(Debug)]
pub struct MemStore<D> {
    docs: Arc<RwLock<Vec<D>>>,
}

impl<D: Document> MemStore<D> {
    pub fn new() -> Self {
        Self::with_documents(Vec::new())
    }

    pub fn with_documents(docs: Vec<D>) -> Self {
        let docs = Arc::new(RwLock::new(docs));
        MemStore { docs }
    }

    fn read(&self) -> Result<RwLockReadGuard<Vec<D>>> {
        Ok(self.docs.read().map_err(|_| StorageError::Poisoned)?)
    }

    fn write(&self) -> Result<RwLockWriteGuard<Vec<D>>> {
        Ok(self.docs.write().map_err(|_| StorageError::Poisoned)?)
    }

    fn position(docs: &[D], id: &Id<D>) -> Option<usize> {
        docs.iter().position(|d| d.id() == id)
    }
}

impl<D: Document> Default for MemStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for MemStore<D> {
    fn clone(&self) -> Self {
        let docs = self.docs.clone();
        MemStore { docs }
    }
}

impl<D: Document + Send + Sync> Storage<D> for MemStore<D> {
    fn list(&self) -> Result<Vec<D>> {
        Ok(self.read()?.clone())
    }

    fn find(&self, id: &Id<D>) -> Result<Option<D>> {
        let docs = self.read()?;
        let res = docs.iter().find(|d| d.id() == id).cloned();
        trace!("find {} {} -> found:{}", D::NAME, id, res.is_some());
        Ok(res)
    }

    fn append(&self, document: D) -> Result<()> {
        let mut docs = self.write()?;
        if Self::position(&docs, document.id()).is_some() {
            warn!("Refusing to append duplicate {} {}", D::NAME, document.id());
            return Err(StorageError::Duplicate(document.id().to_string()).into());
        }
        debug!("Append {} {}", D::NAME, document.id());
        docs.push(document);
        Ok(())
    }

    fn replace(&self, document: D) -> Result<()> {
        let mut docs = self.write()?;
        let idx = Self::position(&docs, document.id())
            .ok_or_else(|| StorageError::Missing(document.id().to_string()))?;
        debug!("Replace {} {} at {}", D::NAME, document.id(), idx);
        docs[idx] = document;
        Ok(())
    }

    fn remove(&self, id: &Id<D>) -> Result<Option<D>> {
        let mut docs = self.write()?;
        let res = Self::position(&docs, id).map(|idx| docs.remove(idx));
        debug!("Remove {} {} -> removed:{}", D::NAME, id, res.is_some());
        Ok(res)
    }
}
