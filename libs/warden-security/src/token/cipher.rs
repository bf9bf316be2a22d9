//! AES transformations understood by the codec.
//!
//! Transformation names follow the `AES/<mode>/<padding>` convention
//! (`AES/ECB/PKCS5Padding`, `AES/CBC/NoPadding`, `AES/GCM/NoPadding`).

use std::fmt;
use std::str::FromStr;

use aes::cipher::block_padding::{NoPadding, Pkcs7};
use aes::cipher::{BlockCipher, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, AeadCore};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};

use super::error::TokenError;

/// AES block length in bytes.
pub(crate) const BLOCK_LEN: usize = 16;
/// GCM nonce length in bytes (96 bits).
pub(crate) const GCM_NONCE_LEN: usize = 12;

type Aes192Gcm = AesGcm<aes::Aes192, U12>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherMode {
    Ecb,
    Cbc,
    Gcm,
}

impl CipherMode {
    /// Whether the mode works on whole blocks and needs padding.
    #[must_use]
    pub fn is_block_aligned(self) -> bool {
        matches!(self, Self::Ecb | Self::Cbc)
    }

    /// Whether the mode needs an initialization vector retained by the codec.
    #[must_use]
    pub fn needs_iv(self) -> bool {
        matches!(self, Self::Cbc)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Ecb => "ECB",
            Self::Cbc => "CBC",
            Self::Gcm => "GCM",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Padding {
    /// PKCS#5/PKCS#7 block padding.
    Pkcs5,
    /// No cipher padding; block modes get zero fill instead.
    None,
}

impl Padding {
    fn as_str(self) -> &'static str {
        match self {
            Self::Pkcs5 => "PKCS5Padding",
            Self::None => "NoPadding",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeySize {
    #[default]
    Aes128,
    Aes192,
    Aes256,
}

impl KeySize {
    /// Resolve a configured key size in bits. `None` means 128.
    ///
    /// # Errors
    /// Returns [`TokenError::Configuration`] for anything but 128, 192 or 256.
    pub fn from_bits(bits: Option<u32>) -> Result<Self, TokenError> {
        match bits {
            None | Some(128) => Ok(Self::Aes128),
            Some(192) => Ok(Self::Aes192),
            Some(256) => Ok(Self::Aes256),
            Some(other) => Err(TokenError::Configuration(format!(
                "unsupported AES key size {other}, expected 128, 192 or 256"
            ))),
        }
    }

    #[must_use]
    pub fn bits(self) -> u32 {
        match self {
            Self::Aes128 => 128,
            Self::Aes192 => 192,
            Self::Aes256 => 256,
        }
    }

    #[must_use]
    pub fn key_len(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }
}

/// A parsed cipher transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherSpec {
    pub mode: CipherMode,
    pub padding: Padding,
}

impl Default for CipherSpec {
    fn default() -> Self {
        Self {
            mode: CipherMode::Ecb,
            padding: Padding::Pkcs5,
        }
    }
}

impl fmt::Display for CipherSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AES/{}/{}", self.mode.as_str(), self.padding.as_str())
    }
}

impl FromStr for CipherSpec {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('/').map(str::trim).collect();
        let (algorithm, mode, padding) = match parts.as_slice() {
            [algorithm] => (*algorithm, "ECB", "PKCS5Padding"),
            [algorithm, mode, padding] => (*algorithm, *mode, *padding),
            _ => {
                return Err(TokenError::Configuration(format!(
                    "malformed cipher transformation '{s}'"
                )));
            }
        };

        if !algorithm.eq_ignore_ascii_case("AES") {
            return Err(TokenError::Configuration(format!(
                "unsupported cipher algorithm '{algorithm}'"
            )));
        }

        let mode = match mode.to_ascii_uppercase().as_str() {
            "ECB" => CipherMode::Ecb,
            "CBC" => CipherMode::Cbc,
            "GCM" => CipherMode::Gcm,
            _ => {
                return Err(TokenError::Configuration(format!(
                    "unsupported cipher mode '{mode}'"
                )));
            }
        };

        let padding = match padding.to_ascii_uppercase().as_str() {
            "PKCS5PADDING" | "PKCS7PADDING" => Padding::Pkcs5,
            "NOPADDING" => Padding::None,
            _ => {
                return Err(TokenError::Configuration(format!(
                    "unsupported cipher padding '{padding}'"
                )));
            }
        };

        if mode == CipherMode::Gcm && padding != Padding::None {
            return Err(TokenError::Configuration(
                "GCM is a stream mode and only supports NoPadding".to_owned(),
            ));
        }

        Ok(Self { mode, padding })
    }
}

impl CipherSpec {
    /// Encrypt `plaintext` with a fresh cipher instance.
    ///
    /// Block modes with `NoPadding` expect block-aligned input. GCM output is
    /// `nonce || ciphertext || tag`.
    pub(crate) fn seal(
        self,
        key_size: KeySize,
        key: &[u8],
        iv: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, TokenError> {
        match (self.mode, key_size) {
            (CipherMode::Ecb, KeySize::Aes128) => ecb_seal::<aes::Aes128>(key, self.padding, plaintext),
            (CipherMode::Ecb, KeySize::Aes192) => ecb_seal::<aes::Aes192>(key, self.padding, plaintext),
            (CipherMode::Ecb, KeySize::Aes256) => ecb_seal::<aes::Aes256>(key, self.padding, plaintext),
            (CipherMode::Cbc, KeySize::Aes128) => cbc_seal::<aes::Aes128>(key, iv, self.padding, plaintext),
            (CipherMode::Cbc, KeySize::Aes192) => cbc_seal::<aes::Aes192>(key, iv, self.padding, plaintext),
            (CipherMode::Cbc, KeySize::Aes256) => cbc_seal::<aes::Aes256>(key, iv, self.padding, plaintext),
            (CipherMode::Gcm, KeySize::Aes128) => gcm_seal::<Aes128Gcm>(key, plaintext),
            (CipherMode::Gcm, KeySize::Aes192) => gcm_seal::<Aes192Gcm>(key, plaintext),
            (CipherMode::Gcm, KeySize::Aes256) => gcm_seal::<Aes256Gcm>(key, plaintext),
        }
    }

    /// Reverse of [`CipherSpec::seal`].
    pub(crate) fn open(
        self,
        key_size: KeySize,
        key: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, TokenError> {
        if self.mode.is_block_aligned()
            && (ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0)
        {
            return Err(TokenError::invalid(format!(
                "ciphertext length {} is not a multiple of the block size",
                ciphertext.len()
            )));
        }

        match (self.mode, key_size) {
            (CipherMode::Ecb, KeySize::Aes128) => ecb_open::<aes::Aes128>(key, self.padding, ciphertext),
            (CipherMode::Ecb, KeySize::Aes192) => ecb_open::<aes::Aes192>(key, self.padding, ciphertext),
            (CipherMode::Ecb, KeySize::Aes256) => ecb_open::<aes::Aes256>(key, self.padding, ciphertext),
            (CipherMode::Cbc, KeySize::Aes128) => cbc_open::<aes::Aes128>(key, iv, self.padding, ciphertext),
            (CipherMode::Cbc, KeySize::Aes192) => cbc_open::<aes::Aes192>(key, iv, self.padding, ciphertext),
            (CipherMode::Cbc, KeySize::Aes256) => cbc_open::<aes::Aes256>(key, iv, self.padding, ciphertext),
            (CipherMode::Gcm, KeySize::Aes128) => gcm_open::<Aes128Gcm>(key, ciphertext),
            (CipherMode::Gcm, KeySize::Aes192) => gcm_open::<Aes192Gcm>(key, ciphertext),
            (CipherMode::Gcm, KeySize::Aes256) => gcm_open::<Aes256Gcm>(key, ciphertext),
        }
    }
}

fn key_error(e: impl fmt::Display) -> TokenError {
    TokenError::EncryptionFailed(format!("cipher rejected key material: {e}"))
}

fn ecb_seal<C>(key: &[u8], padding: Padding, plaintext: &[u8]) -> Result<Vec<u8>, TokenError>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
{
    let cipher = ecb::Encryptor::<C>::new_from_slice(key).map_err(key_error)?;
    Ok(match padding {
        Padding::Pkcs5 => cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        Padding::None => cipher.encrypt_padded_vec_mut::<NoPadding>(plaintext),
    })
}

fn ecb_open<C>(key: &[u8], padding: Padding, ciphertext: &[u8]) -> Result<Vec<u8>, TokenError>
where
    C: BlockDecryptMut + BlockCipher + KeyInit,
{
    let cipher = ecb::Decryptor::<C>::new_from_slice(key).map_err(key_error)?;
    match padding {
        Padding::Pkcs5 => cipher.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        Padding::None => cipher.decrypt_padded_vec_mut::<NoPadding>(ciphertext),
    }
    .map_err(|_| TokenError::invalid("bad block padding"))
}

fn cbc_seal<C>(
    key: &[u8],
    iv: &[u8],
    padding: Padding,
    plaintext: &[u8],
) -> Result<Vec<u8>, TokenError>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
{
    let cipher = cbc::Encryptor::<C>::new_from_slices(key, iv).map_err(key_error)?;
    Ok(match padding {
        Padding::Pkcs5 => cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        Padding::None => cipher.encrypt_padded_vec_mut::<NoPadding>(plaintext),
    })
}

fn cbc_open<C>(
    key: &[u8],
    iv: &[u8],
    padding: Padding,
    ciphertext: &[u8],
) -> Result<Vec<u8>, TokenError>
where
    C: BlockDecryptMut + BlockCipher + KeyInit,
{
    let cipher = cbc::Decryptor::<C>::new_from_slices(key, iv).map_err(key_error)?;
    match padding {
        Padding::Pkcs5 => cipher.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        Padding::None => cipher.decrypt_padded_vec_mut::<NoPadding>(ciphertext),
    }
    .map_err(|_| TokenError::invalid("bad block padding"))
}

fn gcm_seal<A>(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, TokenError>
where
    A: Aead + AeadCore<NonceSize = U12> + KeyInit,
{
    let cipher = A::new_from_slice(key).map_err(key_error)?;

    let mut nonce_bytes = [0u8; GCM_NONCE_LEN];
    rand::RngCore::fill_bytes(&mut rand::rng(), &mut nonce_bytes);
    let nonce: aes_gcm::aead::Nonce<A> = nonce_bytes.into();

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| TokenError::EncryptionFailed(format!("GCM encryption failed: {e}")))?;

    let mut sealed = Vec::with_capacity(GCM_NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

fn gcm_open<A>(key: &[u8], sealed: &[u8]) -> Result<Vec<u8>, TokenError>
where
    A: Aead + AeadCore<NonceSize = U12> + KeyInit,
{
    if sealed.len() <= GCM_NONCE_LEN {
        return Err(TokenError::invalid("ciphertext too short"));
    }
    let cipher = A::new_from_slice(key).map_err(key_error)?;

    let (nonce_bytes, ciphertext) = sealed.split_at(GCM_NONCE_LEN);
    let nonce_bytes: [u8; GCM_NONCE_LEN] = nonce_bytes
        .try_into()
        .map_err(|_| TokenError::invalid("invalid nonce length"))?;
    let nonce: aes_gcm::aead::Nonce<A> = nonce_bytes.into();

    cipher
        .decrypt(&nonce, ciphertext)
        .map_err(|_| TokenError::invalid("authentication tag mismatch"))
}
