// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Instructions
//!
//! The four vault operations and the signed envelope they travel in.
//!
//! The envelope's signature is the co-signing proof: it covers the bincode
//! encoding of `(program_id, signer, nonce, instruction)` under a fixed
//! domain tag. The program id ties it to one vault; the nonce must equal the
//! signer's committed-instruction count, so it commits at most once.

use genesys_protocol::config::INSTRUCTION_DOMAIN;
use genesys_protocol::crypto::keys::{Keypair, Pubkey, Signature};
use genesys_protocol::crypto::signatures::{sign_domain, verify_domain};
use serde::{Deserialize, Serialize};

use crate::error::VaultError;
use crate::state::VaultConfig;

/// A vault operation. Addresses are never passed, only bumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultInstruction {
    /// Create the registry and open the reserve. Signed by the admin.
    Initialize {
        asset: Pubkey,
        reserve_bump: u8,
        registry_bump: u8,
        config: VaultConfig,
    },

    /// Spread the reserve surplus over locked principal. Admin only.
    RefreshReserve { registry_bump: u8, reserve_bump: u8 },

    /// Lock `amount` from the signer's `source` token account.
    Deposit {
        registry_bump: u8,
        reserve_bump: u8,
        record_bump: u8,
        custody_bump: u8,
        lock_duration_secs: u64,
        amount: u64,
        source: Pubkey,
    },

    /// Pay principal and yield to `destination` once the lock has run out.
    Withdraw {
        registry_bump: u8,
        reserve_bump: u8,
        record_bump: u8,
        custody_bump: u8,
        destination: Pubkey,
    },
}

impl VaultInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            VaultInstruction::Initialize { .. } => "initialize",
            VaultInstruction::RefreshReserve { .. } => "refresh_reserve",
            VaultInstruction::Deposit { .. } => "deposit",
            VaultInstruction::Withdraw { .. } => "withdraw",
        }
    }
}

/// An instruction plus its signer's proof of consent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInstruction {
    pub signer: Pubkey,
    /// The signer's next nonce when this was signed.
    pub nonce: u64,
    pub instruction: VaultInstruction,
    pub signature: Signature,
}

impl SignedInstruction {
    /// Sign `instruction` for the vault at `program_id`.
    pub fn sign(
        program_id: &Pubkey,
        keypair: &Keypair,
        nonce: u64,
        instruction: VaultInstruction,
    ) -> Result<Self, VaultError> {
        let signer = keypair.pubkey();
        let payload = signing_payload(program_id, &signer, nonce, &instruction)?;
        let signature = sign_domain(keypair, INSTRUCTION_DOMAIN, &payload);
        Ok(Self {
            signer,
            nonce,
            instruction,
            signature,
        })
    }

    /// Check the signature. Fails with [`VaultError::Unauthorized`].
    pub fn verify(&self, program_id: &Pubkey) -> Result<(), VaultError> {
        let payload = signing_payload(program_id, &self.signer, self.nonce, &self.instruction)?;
        verify_domain(&self.signer, INSTRUCTION_DOMAIN, &payload, &self.signature)
            .map_err(|_| VaultError::Unauthorized {
                signer: self.signer,
            })
    }
}

fn signing_payload(
    program_id: &Pubkey,
    signer: &Pubkey,
    nonce: u64,
    instruction: &VaultInstruction,
) -> Result<Vec<u8>, VaultError> {
    Ok(bincode::serialize(&(program_id, signer, nonce, instruction))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refresh() -> VaultInstruction {
        VaultInstruction::RefreshReserve {
            registry_bump: 255,
            reserve_bump: 254,
        }
    }

    #[test]
    fn signed_instruction_verifies() {
        let program = Keypair::from_seed(&[1; 32]).pubkey();
        let admin = Keypair::from_seed(&[2; 32]);
        let ix = SignedInstruction::sign(&program, &admin, 0, refresh()).unwrap();
        assert!(ix.verify(&program).is_ok());
    }

    #[test]
    fn tampered_instruction_is_rejected() {
        let program = Keypair::from_seed(&[1; 32]).pubkey();
        let admin = Keypair::from_seed(&[2; 32]);
        let mut ix = SignedInstruction::sign(&program, &admin, 0, refresh()).unwrap();
        ix.instruction = VaultInstruction::RefreshReserve {
            registry_bump: 254,
            reserve_bump: 254,
        };
        assert!(matches!(ix.verify(&program), Err(VaultError::Unauthorized { .. })));
    }

    #[test]
    fn signature_is_bound_to_program() {
        let program = Keypair::from_seed(&[1; 32]).pubkey();
        let other = Keypair::from_seed(&[9; 32]).pubkey();
        let admin = Keypair::from_seed(&[2; 32]);
        let ix = SignedInstruction::sign(&program, &admin, 0, refresh()).unwrap();
        assert!(ix.verify(&other).is_err());
    }

    #[test]
    fn swapped_signer_is_rejected() {
        let program = Keypair::from_seed(&[1; 32]).pubkey();
        let admin = Keypair::from_seed(&[2; 32]);
        let mallory = Keypair::from_seed(&[3; 32]).pubkey();
        let mut ix = SignedInstruction::sign(&program, &admin, 0, refresh()).unwrap();
        ix.signer = mallory;
        assert_eq!(
            ix.verify(&program),
            Err(VaultError::Unauthorized { signer: mallory })
        );
    }

    #[test]
    fn nonce_is_covered_by_the_signature() {
        let program = Keypair::from_seed(&[1; 32]).pubkey();
        let admin = Keypair::from_seed(&[2; 32]);
        let mut ix = SignedInstruction::sign(&program, &admin, 3, refresh()).unwrap();
        assert!(ix.verify(&program).is_ok());
        ix.nonce = 4;
        assert!(matches!(ix.verify(&program), Err(VaultError::Unauthorized { .. })));
    }
}
