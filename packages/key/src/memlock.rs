//! Best-effort pinning of secret pages into RAM
//!
//! Locking can fail without `CAP_IPC_LOCK` or past `RLIMIT_MEMLOCK`; that is
//! logged and tolerated, the secret is still wiped on drop.
//!
//! Small secrets share pages with each other and with unrelated heap data,
//! and the OS locks whole pages. Every locked page therefore carries a
//! holder count, and it is only unlocked when its last holder lets go.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Page address to number of live buffers holding it locked
static LOCKED_PAGES: Mutex<BTreeMap<usize, usize>> = Mutex::new(BTreeMap::new());

/// Lock the pages backing `buf`; returns whether the lock took
pub(crate) fn lock(buf: &[u8]) -> bool {
    if buf.is_empty() {
        return false;
    }
    let page_size = region::page::size();
    let mut pages = LOCKED_PAGES.lock().unwrap_or_else(PoisonError::into_inner);

    let mut acquired = Vec::new();
    for page in pages_of(buf, page_size) {
        if let Some(holders) = pages.get_mut(&page) {
            *holders += 1;
            acquired.push(page);
            continue;
        }
        match region::lock(page as *const u8, page_size) {
            Ok(guard) => {
                // the holder count owns the lock from here on
                std::mem::forget(guard);
                pages.insert(page, 1);
                acquired.push(page);
            }
            Err(e) => {
                log::warn!("mlock failed (non-fatal, secret may be swapped): {e}");
                for page in acquired {
                    release(&mut pages, page, page_size);
                }
                return false;
            }
        }
    }
    true
}

/// Undo [`lock`] before the buffer is released
pub(crate) fn unlock(buf: &[u8]) {
    if buf.is_empty() {
        return;
    }
    let page_size = region::page::size();
    let mut pages = LOCKED_PAGES.lock().unwrap_or_else(PoisonError::into_inner);
    for page in pages_of(buf, page_size) {
        release(&mut pages, page, page_size);
    }
}

fn release(pages: &mut BTreeMap<usize, usize>, page: usize, page_size: usize) {
    let Some(holders) = pages.get_mut(&page) else {
        return;
    };
    *holders -= 1;
    if *holders == 0 {
        pages.remove(&page);
        if let Err(e) = region::unlock(page as *const u8, page_size) {
            log::debug!("munlock failed: {e}");
        }
    }
}

fn pages_of(buf: &[u8], page_size: usize) -> impl Iterator<Item = usize> {
    let start = buf.as_ptr() as usize;
    let first = start - start % page_size;
    let last = start + (buf.len() - 1);
    (first..=last).step_by(page_size)
}

/// Number of live locks holding the page that starts `buf`
#[cfg(test)]
pub(crate) fn holders(buf: &[u8]) -> usize {
    let page_size = region::page::size();
    let pages = LOCKED_PAGES.lock().unwrap_or_else(PoisonError::into_inner);
    pages_of(buf, page_size)
        .next()
        .and_then(|page| pages.get(&page).copied())
        .unwrap_or(0)
}
