//! CI signing key validation through the `gpg` CLI.

use crate::command::{CommandError, CommandRunner, ExternalCommand};

/// Environment variable holding the armored public key.
pub const PUBLIC_KEY_VAR: &str = "GPG_SIGNING_KEY_CI_PUBLIC";
/// Environment variable holding the armored private key.
pub const PRIVATE_KEY_VAR: &str = "GPG_SIGNING_KEY_CI_PRIVATE";

/// Which signer the CI key must be certified by, and where to fetch it.
#[derive(Debug, Clone)]
pub struct KeyCheckConfig {
    /// Key id or fingerprint of the required signer
    pub signer_key_id: String,

    /// Keyserver used when the signer key is not in the keyring
    pub keyserver: String,
}

impl Default for KeyCheckConfig {
    fn default() -> Self {
        Self {
            signer_key_id: "8528A7AE7B308461".to_string(),
            keyserver: "hkps://keys.openpgp.org".to_string(),
        }
    }
}

/// The CI key pair under test.
#[derive(Clone)]
pub struct KeyMaterial {
    pub public: String,
    pub private: String,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("public_len", &self.public.len())
            .field("private", &"<redacted>")
            .finish()
    }
}

impl KeyMaterial {
    /// Read the key pair from [`PUBLIC_KEY_VAR`] and [`PRIVATE_KEY_VAR`].
    pub fn from_env() -> Result<Self, KeyError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the key pair through `lookup`; missing or empty values fail.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, KeyError> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        match (read(PUBLIC_KEY_VAR), read(PRIVATE_KEY_VAR)) {
            (Some(public), Some(private)) => Ok(Self { public, private }),
            _ => Err(KeyError::MissingKeyData),
        }
    }
}

/// Errors that can occur while checking keys.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("Missing key data: set GPG_SIGNING_KEY_CI_PUBLIC and GPG_SIGNING_KEY_CI_PRIVATE")]
    MissingKeyData,

    #[error("No fingerprint found in gpg output")]
    NoFingerprint,

    #[error("Public and private key mismatch: {public} != {private}")]
    Mismatch { public: String, private: String },

    #[error("Key {0} is expired")]
    Expired(String),

    #[error("Signer key id is empty")]
    EmptySigner,

    #[error("Key {fingerprint} is not signed by required signer {signer}")]
    NotSigned { fingerprint: String, signer: String },

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// An empty signer id would match every signature record.
fn require_signer(signer: &str) -> Result<(), KeyError> {
    if signer.trim().is_empty() {
        return Err(KeyError::EmptySigner);
    }
    Ok(())
}

/// `gpg --batch --yes` followed by `args`.
fn gpg<'a>(args: impl IntoIterator<Item = &'a str>) -> ExternalCommand {
    ExternalCommand::new("gpg").args(["--batch", "--yes"]).args(args)
}

/// Fields of the colon-delimited records of type `kind` (`pub`, `fpr`, ...).
fn records<'a>(colons: &'a str, kind: &'a str) -> impl Iterator<Item = Vec<&'a str>> + 'a {
    colons
        .lines()
        .map(|line| line.split(':').collect::<Vec<_>>())
        .filter(move |fields| fields.first() == Some(&kind))
}

/// First fingerprint (field 10 of an `fpr` record) in `--with-colons` output.
pub fn parse_fingerprint(colons: &str) -> Result<String, KeyError> {
    records(colons, "fpr")
        .find_map(|fields| fields.get(9).map(|f| f.to_string()))
        .filter(|fpr| !fpr.is_empty())
        .ok_or(KeyError::NoFingerprint)
}

/// Import `key` into the keyring and return its fingerprint.
pub fn import_key(runner: &impl CommandRunner, key: &str) -> Result<String, KeyError> {
    let preview = runner.run_checked(
        &gpg(["--import-options", "show-only", "--with-colons", "--import"]).stdin(key),
    )?;
    let fingerprint = parse_fingerprint(&preview.stdout)?;

    runner.run_checked(&gpg(["--import"]).stdin(key))?;
    tracing::debug!("Imported key {}", fingerprint);

    Ok(fingerprint)
}

/// Make sure the signer key is in the keyring, fetching it if needed.
pub fn ensure_signer_key(
    runner: &impl CommandRunner,
    config: &KeyCheckConfig,
) -> Result<(), KeyError> {
    let listed = runner.run(&gpg(["--list-keys", config.signer_key_id.as_str()]))?;
    if listed.success {
        return Ok(());
    }

    tracing::info!(
        "Fetching signer key {} from {}",
        config.signer_key_id,
        config.keyserver
    );
    runner.run_checked(&gpg([
        "--keyserver",
        config.keyserver.as_str(),
        "--recv-keys",
        config.signer_key_id.as_str(),
    ]))?;

    Ok(())
}

/// Whether the primary key `fingerprint` is still valid at Unix time `now`.
pub fn is_key_unexpired(
    runner: &impl CommandRunner,
    fingerprint: &str,
    now: i64,
) -> Result<bool, KeyError> {
    let output = runner.run_checked(&gpg(["--with-colons", "--list-keys", fingerprint]))?;

    let Some(fields) = records(&output.stdout, "pub").next() else {
        return Ok(false);
    };

    match fields.get(6).copied().unwrap_or("") {
        "" => Ok(true),
        expires => Ok(expires.parse::<i64>().map(|t| t > now).unwrap_or(false)),
    }
}

/// Whether `fingerprint` carries a signature issued by `signer`.
///
/// A `sig` record matches when its issuer key id (field 5) equals `signer`,
/// or its issuer fingerprint (field 13) ends with it. Comparison ignores case.
pub fn is_key_signed_by(
    runner: &impl CommandRunner,
    fingerprint: &str,
    signer: &str,
) -> Result<bool, KeyError> {
    require_signer(signer)?;

    let output = runner.run_checked(&gpg(["--with-colons", "--check-sigs", fingerprint]))?;
    let signer = signer.trim().to_ascii_uppercase();

    let signed = records(&output.stdout, "sig").any(|fields| {
        let key_id = fields.get(4).map(|f| f.to_ascii_uppercase());
        let issuer = fields.get(12).map(|f| f.to_ascii_uppercase());

        key_id.as_deref() == Some(signer.as_str())
            || issuer.is_some_and(|fpr| !fpr.is_empty() && fpr.ends_with(&signer))
    });

    Ok(signed)
}

/// Validate the CI key pair against the configured signer.
///
/// Returns the fingerprint of the validated key.
pub fn check_keys(
    runner: &impl CommandRunner,
    keys: &KeyMaterial,
    config: &KeyCheckConfig,
    now: i64,
) -> Result<String, KeyError> {
    require_signer(&config.signer_key_id)?;

    let public = import_key(runner, &keys.public)?;
    let private = import_key(runner, &keys.private)?;
    if public != private {
        return Err(KeyError::Mismatch { public, private });
    }

    ensure_signer_key(runner, config)?;

    if !is_key_unexpired(runner, &public, now)? {
        return Err(KeyError::Expired(public));
    }

    if !is_key_signed_by(runner, &public, &config.signer_key_id)? {
        return Err(KeyError::NotSigned {
            fingerprint: public,
            signer: config.signer_key_id.clone(),
        });
    }

    tracing::info!("Key {} is valid and signed by {}", public, config.signer_key_id);
    Ok(public)
}
