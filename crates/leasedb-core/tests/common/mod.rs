use leasedb_core::errors::{ErrorKind, LeaseError, Result};
use leasedb_core::kv::{KvRead, KvWrite};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::ops::ControlFlow;

/// Ordered in-memory key space standing in for one open transaction
#[derive(Default)]
pub struct MemTxn {
    data: RefCell<BTreeMap<Vec<u8>, Vec<u8>>>,
    fail_writes: Cell<bool>,
}

#[allow(dead_code)]
impl MemTxn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail like a broken engine would
    pub fn fail_writes(&self) {
        self.fail_writes.set(true);
    }

    pub fn raw_put(&self, key: &[u8], value: &[u8]) {
        self.data.borrow_mut().insert(key.to_vec(), value.to_vec());
    }

    pub fn keys(&self) -> Vec<String> {
        self.data
            .borrow()
            .keys()
            .map(|k| String::from_utf8_lossy(k).into_owned())
            .collect()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.get() {
            return Err(LeaseError::new(ErrorKind::Internal)
                .with_op("mem_write")
                .with_message("injected write failure"));
        }
        Ok(())
    }
}

impl KvRead for MemTxn {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn scan_prefix(
        &self,
        prefix: &[u8],
        visit: &mut dyn FnMut(&[u8], &[u8]) -> Result<ControlFlow<()>>,
    ) -> Result<()> {
        let entries: Vec<(Vec<u8>, Vec<u8>)> = self
            .data
            .borrow()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (k, v) in entries {
            if visit(&k, &v)?.is_break() {
                break;
            }
        }
        Ok(())
    }
}

impl KvWrite for MemTxn {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.check_writable()?;
        self.raw_put(key, value);
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<bool> {
        self.check_writable()?;
        Ok(self.data.borrow_mut().remove(key).is_some())
    }

    fn delete_prefix(&self, prefix: &[u8]) -> Result<u64> {
        self.check_writable()?;
        let mut data = self.data.borrow_mut();
        let before = data.len();
        data.retain(|k, _| !k.starts_with(prefix));
        Ok((before - data.len()) as u64)
    }
}
