//! MessageBatch - publish する payload の列
//!
//! # 不変条件
//! - 空ではない
//! - 同じバイト列の payload が二つ以上含まれない
//!
//! どちらも dispatch 前に `MessageBatch::new` で検証する。

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::BTreeMap;

use super::errors::PublishError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBatch {
    payloads: Vec<Vec<u8>>,
}

impl MessageBatch {
    pub fn new(payloads: Vec<Vec<u8>>) -> Result<Self, PublishError> {
        if payloads.is_empty() {
            return Err(PublishError::EmptyBatch);
        }

        let duplicates = find_duplicates(&payloads);
        if !duplicates.is_empty() {
            return Err(PublishError::Duplicates(
                duplicates.into_iter().map(|p| STANDARD.encode(p)).collect(),
            ));
        }

        Ok(Self { payloads })
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.payloads.iter().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.payloads.iter().map(Vec::as_slice)
    }
}

/// Payloads seen more than once, each reported once, in order of first appearance.
///
/// Keyed by the exact byte sequence (ordered map, no hashing).
fn find_duplicates(payloads: &[Vec<u8>]) -> Vec<&[u8]> {
    let mut seen: BTreeMap<&[u8], usize> = BTreeMap::new();
    let mut duplicates = Vec::new();
    for payload in payloads {
        let count = seen.entry(payload.as_slice()).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(payload.as_slice());
        }
    }
    duplicates
}
