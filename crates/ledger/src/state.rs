//! The ledger: a synchronous, single-threaded state machine tying receipts, challenges,
//! verifications, and reward accounts together.

use std::collections::HashMap;

use tracing::{info, instrument};
use vinfer_core::{Challenge, GemmCoordinate, Job, Receipt, RewardAccount, Verification, Worker};
use vinfer_randomness::{derive_vectors, select_indices};

use crate::error::LedgerError;

/// The coordination ledger. Every operation is a total function of its arguments against the
/// current state; there are no suspension points and no background work.
#[derive(Debug, Default)]
pub struct Ledger {
    workers: HashMap<String, Worker>,
    reward_accounts: HashMap<String, RewardAccount>,
    jobs: HashMap<String, Job>,
    receipts: HashMap<String, Receipt>,
    challenges: HashMap<String, Challenge>,
    verifications: HashMap<String, Verification>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or re-registers) a worker. Idempotent on `pubkey`: a later call overwrites
    /// the worker record entirely, including resetting reputation to zero (re-registration is
    /// treated as a fresh re-staking event). The reward account, by contrast, is only created
    /// if one doesn't already exist, so accrued credits/balance survive re-registration.
    #[instrument(skip(self, supported_skus))]
    pub fn register_worker(&mut self, pubkey: &str, stake: u64, supported_skus: Vec<String>) {
        self.workers.insert(
            pubkey.to_owned(),
            Worker {
                pubkey: pubkey.to_owned(),
                stake,
                supported_skus,
                reputation_score: 0,
            },
        );
        self.reward_accounts
            .entry(pubkey.to_owned())
            .or_default();
    }

    /// Stores a job record.
    #[instrument(skip(self, job), fields(job_id = %job.job_id))]
    pub fn create_job(&mut self, job: Job) {
        self.jobs.insert(job.job_id.clone(), job);
    }

    /// Submits a worker's receipt, validating that its worker and job both exist.
    ///
    /// Returns the receipt id (`receipt.receipt_id()`, a pure content hash — see
    /// [`vinfer_core::Receipt::receipt_id`]).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownWorker`] or [`LedgerError::UnknownJob`] if the receipt
    /// names a worker or job this ledger doesn't have.
    #[instrument(skip(self, receipt), fields(worker = %receipt.worker_pubkey, job_id = %receipt.job_id))]
    pub fn submit_receipt(&mut self, receipt: Receipt) -> Result<String, LedgerError> {
        if !self.workers.contains_key(&receipt.worker_pubkey) {
            return Err(LedgerError::UnknownWorker(receipt.worker_pubkey.clone()));
        }
        if !self.jobs.contains_key(&receipt.job_id) {
            return Err(LedgerError::UnknownJob(receipt.job_id.clone()));
        }
        let receipt_id = receipt.receipt_id();
        self.receipts.insert(receipt_id.clone(), receipt);
        Ok(receipt_id)
    }

    /// Assigns a deterministic challenge to `receipt_id`.
    ///
    /// `seed = receipt_id ":" verifier_pubkey`; `sample_count` GEMM coordinates are chosen via
    /// [`select_indices`] over the receipt's commitments, and `rounds` canonical random-vector
    /// digests are derived via [`derive_vectors`]. Pure in `(receipt_id, verifier_pubkey,
    /// rounds, sample_count)` — see invariant 7.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownReceipt`] if `receipt_id` hasn't been submitted, or
    /// [`LedgerError::DuplicateChallenge`] if one is already assigned.
    #[instrument(skip(self))]
    pub fn assign_challenge(
        &mut self,
        receipt_id: &str,
        verifier_pubkey: &str,
        rounds: usize,
        sample_count: usize,
    ) -> Result<Challenge, LedgerError> {
        let receipt = self
            .receipts
            .get(receipt_id)
            .ok_or_else(|| LedgerError::UnknownReceipt(receipt_id.to_owned()))?;
        if self.challenges.contains_key(receipt_id) {
            return Err(LedgerError::DuplicateChallenge(receipt_id.to_owned()));
        }

        let seed = format!("{receipt_id}:{verifier_pubkey}");
        let selected = select_indices(&seed, receipt.gemm_commitments.len(), sample_count);
        let gemm_indices: Vec<GemmCoordinate> = selected
            .into_iter()
            .filter_map(|idx| receipt.gemm_commitments.get(idx).map(|c| c.coordinate()))
            .collect();
        let random_vectors = derive_vectors(&seed, rounds);

        let challenge = Challenge {
            receipt_id: receipt_id.to_owned(),
            verifier_pubkey: verifier_pubkey.to_owned(),
            gemm_indices,
            random_vectors,
        };
        self.challenges
            .insert(receipt_id.to_owned(), challenge.clone());
        Ok(challenge)
    }

    /// Submits a verifier's verdict and settles it: on a passing verdict, credits the worker's
    /// reward account with the job's `shard_size`/`payment`; on a failing verdict, slashes
    /// `max(stake / 10, 1)` from the worker's stake (floored at zero) and decrements reputation
    /// by one (floored at zero).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownReceipt`] if the verification's receipt id is unknown,
    /// [`LedgerError::DuplicateVerification`] if one is already submitted, or
    /// [`LedgerError::UnknownJob`]/[`LedgerError::UnknownWorker`] if the receipt's job or
    /// worker has since disappeared from the ledger (never true for ledger-originated state).
    #[instrument(skip(self, verification), fields(receipt_id = %verification.receipt_id, verdict = verification.verdict))]
    pub fn submit_verification(&mut self, verification: Verification) -> Result<(), LedgerError> {
        let receipt_id = verification.receipt_id.clone();
        if !self.receipts.contains_key(&receipt_id) {
            return Err(LedgerError::UnknownReceipt(receipt_id));
        }
        if self.verifications.contains_key(&receipt_id) {
            return Err(LedgerError::DuplicateVerification(receipt_id));
        }

        let verdict = verification.verdict;
        self.verifications.insert(receipt_id.clone(), verification);

        if verdict {
            self.settle_reward(&receipt_id)?;
        } else {
            self.slash_worker(&receipt_id)?;
        }
        Ok(())
    }

    fn settle_reward(&mut self, receipt_id: &str) -> Result<(), LedgerError> {
        let receipt = self
            .receipts
            .get(receipt_id)
            .ok_or_else(|| LedgerError::UnknownReceipt(receipt_id.to_owned()))?;
        let job = self
            .jobs
            .get(&receipt.job_id)
            .ok_or_else(|| LedgerError::UnknownJob(receipt.job_id.clone()))?;
        let shard_size = u64::from(job.shard_size);
        let payment = job.payment;
        let worker_pubkey = receipt.worker_pubkey.clone();

        let account = self.reward_accounts.entry(worker_pubkey).or_default();
        let before = (account.credits, account.balance);
        account.credits = account.credits.saturating_add(shard_size);
        account.balance = account.balance.saturating_add(payment);
        info!(
            receipt_id,
            before_credits = before.0,
            before_balance = before.1,
            after_credits = account.credits,
            after_balance = account.balance,
            "settled reward"
        );
        Ok(())
    }

    fn slash_worker(&mut self, receipt_id: &str) -> Result<(), LedgerError> {
        let receipt = self
            .receipts
            .get(receipt_id)
            .ok_or_else(|| LedgerError::UnknownReceipt(receipt_id.to_owned()))?;
        let worker_pubkey = receipt.worker_pubkey.clone();
        let worker = self
            .workers
            .get(&worker_pubkey)
            .ok_or_else(|| LedgerError::UnknownWorker(worker_pubkey.clone()))?;

        let slashed = (worker.stake / 10).max(1);
        let before_stake = worker.stake;
        let before_reputation = worker.reputation_score;
        let new_stake = worker.stake.saturating_sub(slashed);
        let new_reputation = worker.reputation_score.saturating_sub(1);

        if let Some(worker) = self.workers.get_mut(&worker_pubkey) {
            worker.stake = new_stake;
            worker.reputation_score = new_reputation;
        }
        info!(
            receipt_id,
            before_stake,
            before_reputation,
            after_stake = new_stake,
            after_reputation = new_reputation,
            "slashed worker"
        );
        Ok(())
    }

    /// Looks up a registered worker.
    #[must_use]
    pub fn worker(&self, pubkey: &str) -> Option<&Worker> {
        self.workers.get(pubkey)
    }

    /// Looks up a worker's reward account.
    #[must_use]
    pub fn reward_account(&self, pubkey: &str) -> Option<&RewardAccount> {
        self.reward_accounts.get(pubkey)
    }

    /// Looks up a submitted receipt.
    #[must_use]
    pub fn receipt(&self, receipt_id: &str) -> Option<&Receipt> {
        self.receipts.get(receipt_id)
    }

    /// Looks up an assigned challenge.
    #[must_use]
    pub fn challenge(&self, receipt_id: &str) -> Option<&Challenge> {
        self.challenges.get(receipt_id)
    }

    /// Looks up a submitted verification.
    #[must_use]
    pub fn verification(&self, receipt_id: &str) -> Option<&Verification> {
        self.verifications.get(receipt_id)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use vinfer_core::{GemmCommitment, Job, Receipt, Verification};

    use super::Ledger;

    fn sample_job() -> Job {
        Job {
            job_id: "job-1".to_owned(),
            sku_id: "sku-1".to_owned(),
            input_root: "input-root".to_owned(),
            shard_size: 4,
            payment: 10,
        }
    }

    fn sample_receipt() -> Receipt {
        Receipt {
            worker_pubkey: "worker-1".to_owned(),
            job_id: "job-1".to_owned(),
            shard_id: "shard-1".to_owned(),
            sku_id: "sku-1".to_owned(),
            output_root: "aa".to_owned(),
            gemm_commitments: vec![GemmCommitment {
                layer_index: 0,
                gemm_index: 0,
                merkle_root: "bb".to_owned(),
            }],
        }
    }

    #[test]
    fn s5_reward_settlement() {
        let mut ledger = Ledger::new();
        ledger.register_worker("worker-1", 1000, vec![]);
        ledger.create_job(sample_job());
        let receipt_id = ledger
            .submit_receipt(sample_receipt())
            .expect("known worker and job");

        ledger
            .submit_verification(Verification {
                receipt_id: receipt_id.clone(),
                verifier_pubkey: "verifier-1".to_owned(),
                gemm_indices: vec![],
                random_vectors: vec![],
                verdict: true,
            })
            .expect("known receipt, first verification");

        let account = ledger.reward_account("worker-1").expect("account exists");
        assert_eq!(account.credits, 4);
        assert_eq!(account.balance, 10);
        let worker = ledger.worker("worker-1").expect("worker exists");
        assert_eq!(worker.stake, 1000);
    }

    #[test]
    fn s6_slashing() {
        let mut ledger = Ledger::new();
        ledger.register_worker("worker-1", 1000, vec![]);
        ledger.create_job(sample_job());
        let receipt_id = ledger
            .submit_receipt(sample_receipt())
            .expect("known worker and job");

        ledger
            .submit_verification(Verification {
                receipt_id: receipt_id.clone(),
                verifier_pubkey: "verifier-1".to_owned(),
                gemm_indices: vec![],
                random_vectors: vec![],
                verdict: false,
            })
            .expect("known receipt, first verification");

        let worker = ledger.worker("worker-1").expect("worker exists");
        assert_eq!(worker.stake, 900);
        assert_eq!(worker.reputation_score, 0);
    }

    #[test]
    fn invariant_2_duplicate_challenge_rejected() {
        let mut ledger = Ledger::new();
        ledger.register_worker("worker-1", 1000, vec![]);
        ledger.create_job(sample_job());
        let receipt_id = ledger
            .submit_receipt(sample_receipt())
            .expect("known worker and job");

        ledger
            .assign_challenge(&receipt_id, "verifier-1", 3, 2)
            .expect("first challenge");
        let err = ledger.assign_challenge(&receipt_id, "verifier-1", 3, 2);
        assert!(err.is_err());
    }

    #[test]
    fn invariant_2_duplicate_verification_rejected() {
        let mut ledger = Ledger::new();
        ledger.register_worker("worker-1", 1000, vec![]);
        ledger.create_job(sample_job());
        let receipt_id = ledger
            .submit_receipt(sample_receipt())
            .expect("known worker and job");

        let verification = Verification {
            receipt_id: receipt_id.clone(),
            verifier_pubkey: "verifier-1".to_owned(),
            gemm_indices: vec![],
            random_vectors: vec![],
            verdict: true,
        };
        ledger
            .submit_verification(verification.clone())
            .expect("first verification");
        assert!(ledger.submit_verification(verification).is_err());
    }

    #[test]
    fn s4_deterministic_challenge() {
        let mut ledger_a = Ledger::new();
        let mut ledger_b = Ledger::new();
        for ledger in [&mut ledger_a, &mut ledger_b] {
            ledger.register_worker("worker-1", 1000, vec![]);
            ledger.create_job(sample_job());
            ledger
                .submit_receipt(sample_receipt())
                .expect("known worker and job");
        }

        let receipt_id = sample_receipt().receipt_id();
        let challenge_a = ledger_a
            .assign_challenge(&receipt_id, "v", 3, 2)
            .expect("known receipt");
        let challenge_b = ledger_b
            .assign_challenge(&receipt_id, "v", 3, 2)
            .expect("known receipt");
        assert_eq!(challenge_a, challenge_b);
    }

    #[test]
    fn stake_and_reputation_never_go_negative() {
        let mut ledger = Ledger::new();
        ledger.register_worker("worker-1", 0, vec![]);
        ledger.create_job(sample_job());
        let receipt_id = ledger
            .submit_receipt(sample_receipt())
            .expect("known worker and job");
        ledger
            .submit_verification(Verification {
                receipt_id,
                verifier_pubkey: "verifier-1".to_owned(),
                gemm_indices: vec![],
                random_vectors: vec![],
                verdict: false,
            })
            .expect("known receipt, first verification");
        let worker = ledger.worker("worker-1").expect("worker exists");
        assert_eq!(worker.stake, 0);
    }

    #[test]
    fn unknown_worker_rejects_receipt() {
        let mut ledger = Ledger::new();
        ledger.create_job(sample_job());
        assert!(ledger.submit_receipt(sample_receipt()).is_err());
    }

    proptest! {
        #[test]
        fn settlement_never_drives_stake_or_reputation_negative_and_settles_once(
            stake in 0_u64..1_000_000,
            verdict in any::<bool>(),
        ) {
            let mut ledger = Ledger::new();
            ledger.register_worker("worker-1", stake, vec![]);
            ledger.create_job(sample_job());
            let receipt_id = ledger
                .submit_receipt(sample_receipt())
                .expect("known worker and job");

            ledger
                .submit_verification(Verification {
                    receipt_id: receipt_id.clone(),
                    verifier_pubkey: "verifier-1".to_owned(),
                    gemm_indices: vec![],
                    random_vectors: vec![],
                    verdict,
                })
                .expect("known receipt, first verification");

            let worker = ledger.worker("worker-1").expect("worker exists");
            prop_assert!(worker.stake <= stake);
            // register_worker always starts reputation at 0, and slashing only ever
            // saturating-subtracts, so it can never move off zero either way.
            prop_assert_eq!(worker.reputation_score, 0);

            let duplicate = ledger.submit_verification(Verification {
                receipt_id,
                verifier_pubkey: "verifier-1".to_owned(),
                gemm_indices: vec![],
                random_vectors: vec![],
                verdict,
            });
            prop_assert!(duplicate.is_err());
        }
    }
}
