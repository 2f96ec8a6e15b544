use super::{Seal, Transaction, TxSeal};
use crate::{time, Error, SealAnchor, TxSealCause};
use blake2::{Blake2b, Digest};
use rayon::prelude::*;
use std::time::SystemTime;

/// A `Validator` turns transactions and block metadata into content digests.
///
/// All methods are deterministic: the same input yields the same digest on every call,
/// regardless of the thread computing it.
pub trait Validator {
    /// Hash `data` with a collision resistant hash function.
    fn digest(&self, data: &[u8]) -> Vec<u8>;

    /// Digest every transaction of `tx_list` in list order.
    ///
    /// Fails with `Error::BuildingTxSeal` if `tx_list` is empty.
    fn build_tx_seal<T>(&self, tx_list: &[T]) -> Result<TxSeal, Error>
    where
        Self: Sync,
        T: Transaction,
    {
        if tx_list.is_empty() {
            return Err(Error::BuildingTxSeal(TxSealCause::EmptyTxList));
        }

        // `collect` on an indexed parallel iterator keeps the list order.
        let digests: Vec<Vec<u8>> = tx_list
            .par_iter()
            .enumerate()
            .map(|(index, transaction)| match transaction.digest_data() {
                Ok(data) => Ok(self.digest(data.as_ref())),
                Err(err) => Err(Error::BuildingTxSeal(TxSealCause::Undigestable {
                    index,
                    error: err.into(),
                })),
            })
            .collect::<Result<_, _>>()?;
        Ok(TxSeal::from(digests))
    }

    /// Build the `Seal` of a proposed block.
    ///
    /// Fails with `Error::BuildingSeal` if `prev_seal` or `creator` is empty.
    fn build_seal(
        &self,
        timestamp: SystemTime,
        prev_seal: &Seal,
        tx_seal: &TxSeal,
        creator: &[u8],
    ) -> Result<Seal, Error> {
        if prev_seal.is_empty() {
            return Err(Error::BuildingSeal(SealAnchor::PrevSeal));
        }
        if creator.is_empty() {
            return Err(Error::BuildingSeal(SealAnchor::Creator));
        }
        Ok(self.compute_seal(timestamp, prev_seal, tx_seal, creator))
    }

    /// Compute a seal without checking the anchor fields.
    ///
    /// This is used for the genesis block, which has no previous seal and no creator.
    fn compute_seal(
        &self,
        timestamp: SystemTime,
        prev_seal: &Seal,
        tx_seal: &TxSeal,
        creator: &[u8],
    ) -> Seal {
        let data = canonical_bytes(timestamp, prev_seal, tx_seal, creator);
        Seal::from(self.digest(&data))
    }
}

/// The default `Validator` hashing with `Blake2b`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultValidator;

impl Validator for DefaultValidator {
    fn digest(&self, data: &[u8]) -> Vec<u8> {
        Blake2b::digest(data).as_slice().to_vec()
    }
}

/// Encode the seal inputs in fixed order.
///
/// Variable length fields are prefixed with their length,
/// so moving bytes between fields changes the encoding.
fn canonical_bytes(
    timestamp: SystemTime,
    prev_seal: &Seal,
    tx_seal: &TxSeal,
    creator: &[u8],
) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(time::system_time_to_bytes(timestamp).as_ref());
    push_field(&mut data, prev_seal.as_bytes());
    push_len(&mut data, tx_seal.len());
    for digest in tx_seal {
        push_field(&mut data, digest);
    }
    push_field(&mut data, creator);
    data
}

fn push_field(data: &mut Vec<u8>, field: &[u8]) {
    push_len(data, field.len());
    data.extend_from_slice(field);
}

fn push_len(data: &mut Vec<u8>, len: usize) {
    data.extend_from_slice(&(len as u64).to_be_bytes());
}
