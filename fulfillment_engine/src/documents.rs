use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use crate::order_types::OrderId;

/// Owns the on-disk layout for fulfillment artifacts. One file per order per
/// document type, named by order id, overwritten on reprocessing. Paths are
/// deterministic so a rerun finds what an earlier run produced.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn label_path(&self, order_id: &OrderId) -> PathBuf {
        self.root.join("labels").join(format!("label_{order_id}.pdf"))
    }

    pub fn packing_slip_path(&self, order_id: &OrderId) -> PathBuf {
        self.root.join("packing_slips").join(format!("packing_slip_{order_id}.pdf"))
    }

    pub fn write_label(&self, order_id: &OrderId, bytes: &[u8]) -> io::Result<PathBuf> {
        let path = self.label_path(order_id);
        write_document(&path, bytes)?;
        Ok(path)
    }
}

fn write_document(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn paths_are_keyed_by_order_id() {
        let store = DocumentStore::new("data");
        let id = OrderId::from("12-34567-89012");
        assert_eq!(store.label_path(&id), PathBuf::from("data/labels/label_12-34567-89012.pdf"));
        assert_eq!(store.packing_slip_path(&id), PathBuf::from("data/packing_slips/packing_slip_12-34567-89012.pdf"));
    }

    #[test]
    fn labels_are_overwritten_on_rerun() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        let id = OrderId::from("A-100");
        store.write_label(&id, b"first").unwrap();
        let path = store.write_label(&id, b"second").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"second");
    }
}
