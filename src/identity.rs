use std::fmt;

use anyhow::{Context, Result};
use ed25519_dalek::{Signer, SigningKey};
use stellar_strkey::ed25519::{PrivateKey, PublicKey as StrkeyPublicKey};
use stellar_xdr::curr::{
    AccountId, DecoratedSignature, MuxedAccount, PublicKey, ScAddress, ScVal, SignatureHint,
    Uint256,
};

/// The key pair that owns the source account and signs every transaction
pub struct Identity {
    signing_key: SigningKey,
    public_key: StrkeyPublicKey,
}

impl Identity {
    /// Derive an identity from a Stellar secret seed (`S...`)
    pub fn from_secret(secret: &str) -> Result<Self> {
        let private_key =
            PrivateKey::from_string(secret.trim()).context("Failed to parse secret key")?;
        let signing_key = SigningKey::from_bytes(&private_key.0);
        let public_key = StrkeyPublicKey(signing_key.verifying_key().to_bytes());

        Ok(Self {
            signing_key,
            public_key,
        })
    }

    /// The account id (`G...`) used to look up the source account
    pub fn account_id(&self) -> String {
        self.public_key.to_string()
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.public_key.0
    }

    pub fn muxed_account(&self) -> MuxedAccount {
        MuxedAccount::Ed25519(Uint256(self.public_key_bytes()))
    }

    /// The caller address passed as the first argument of every contract call
    pub fn sc_address(&self) -> ScAddress {
        ScAddress::Account(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(
            self.public_key_bytes(),
        ))))
    }

    pub fn to_sc_val(&self) -> ScVal {
        ScVal::Address(self.sc_address())
    }

    /// Sign a transaction hash, producing the signature as it is attached to an envelope
    ///
    /// The hint is the last four bytes of the public key.
    pub fn sign_hash(&self, tx_hash: &[u8; 32]) -> Result<DecoratedSignature> {
        let signature = self.signing_key.sign(tx_hash);

        let mut hint = [0u8; 4];
        hint.copy_from_slice(&self.public_key.0[28..]);

        Ok(DecoratedSignature {
            hint: SignatureHint(hint),
            signature: stellar_xdr::curr::Signature(signature.to_bytes().to_vec().try_into()?),
        })
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("account_id", &self.account_id())
            .finish_non_exhaustive()
    }
}
