use anyhow::Error;
use inhalt::digest::Digest;

const ROOT_PREFIX: &str = "/v2";

/// Storage locations understood by the registry. Every path the
/// store touches is derived from one of these; nothing else
/// fabricates paths.
///
/// Blobs live registry-wide under their own address. Links live
/// under the owning repository, keyed by the manifest revision
/// they attach to:
///
/// ```text
/// /v2/blobs/<algorithm>/<hex[..2]>/<hex>/data
/// /v2/repositories/<name>/_manifests/revisions/<algorithm>/<hex>/
///     signatures/<algorithm>/<hex>/link
///     referrers/<media type>/<algorithm>/<hex>/link
/// ```
#[derive(Debug)]
pub enum PathSpec<'a> {
    BlobData {
        digest: &'a Digest,
    },
    ManifestSignaturesRoot {
        name: &'a str,
        revision: &'a Digest,
    },
    ManifestSignatureLink {
        name: &'a str,
        revision: &'a Digest,
        signature: &'a Digest,
    },
    ReferrerMetadataRoot {
        name: &'a str,
        revision: &'a Digest,
        media_type: &'a str,
    },
    ReferrerMetadataLink {
        name: &'a str,
        revision: &'a Digest,
        media_type: &'a str,
        config: &'a Digest,
    },
}

/// Resolves `spec` to its storage path. Pure and deterministic:
/// the same spec yields the same path across restarts, and
/// distinct digest pairs never collide.
#[fehler::throws]
pub fn path_for(spec: PathSpec<'_>) -> String {
    match spec {
        PathSpec::BlobData { digest } => {
            let encoded = digest.encoded();

            format!(
                "{}/blobs/{}/{}/{}/data",
                ROOT_PREFIX,
                digest.algorithm(),
                &encoded[..2],
                encoded,
            )
        }
        PathSpec::ManifestSignaturesRoot { name, revision } => {
            format!("{}/signatures", revision_prefix(name, revision)?)
        }
        PathSpec::ManifestSignatureLink {
            name,
            revision,
            signature,
        } => format!(
            "{}/signatures/{}/{}/link",
            revision_prefix(name, revision)?,
            signature.algorithm(),
            signature.encoded(),
        ),
        PathSpec::ReferrerMetadataRoot {
            name,
            revision,
            media_type,
        } => {
            validate_media_type(media_type)?;

            format!(
                "{}/referrers/{}",
                revision_prefix(name, revision)?,
                media_type,
            )
        }
        PathSpec::ReferrerMetadataLink {
            name,
            revision,
            media_type,
            config,
        } => {
            validate_media_type(media_type)?;

            format!(
                "{}/referrers/{}/{}/{}/link",
                revision_prefix(name, revision)?,
                media_type,
                config.algorithm(),
                config.encoded(),
            )
        }
    }
}

#[fehler::throws]
fn revision_prefix(name: &str, revision: &Digest) -> String {
    validate_repository_name(name)?;

    format!(
        "{}/repositories/{}/_manifests/revisions/{}/{}",
        ROOT_PREFIX,
        name,
        revision.algorithm(),
        revision.encoded(),
    )
}

/// Repository names are slash-separated components of lowercase
/// alphanumerics with `.`, `_` and `-` separators inside.
#[fehler::throws]
pub fn validate_repository_name(name: &str) {
    if name.is_empty() {
        anyhow::bail!("repository name is empty");
    }

    for component in name.split('/') {
        let alnum_boundaries = component
            .chars()
            .next()
            .zip(component.chars().last())
            .map(|(first, last)| {
                is_lower_alnum(first) && is_lower_alnum(last)
            })
            .unwrap_or(false);

        let valid_interior = component
            .chars()
            .all(|x| is_lower_alnum(x) || matches!(x, '.' | '_' | '-'));

        if !alnum_boundaries || !valid_interior {
            anyhow::bail!("invalid repository name '{}'", name);
        }
    }
}

fn is_lower_alnum(x: char) -> bool {
    x.is_ascii_lowercase() || x.is_ascii_digit()
}

/// Media types become path components, so they are held to the
/// characters a media type actually uses. Anything else could
/// climb out of the repository namespace.
#[fehler::throws]
fn validate_media_type(media_type: &str) {
    let mut components = media_type.splitn(2, '/');
    let kind = components.next().unwrap_or_default();
    let subtype = components.next().unwrap_or_default();

    let valid = |part: &str| {
        !part.is_empty()
            && !part.starts_with('.')
            && !part.ends_with('.')
            && part.chars().all(|x| {
                x.is_ascii_alphanumeric()
                    || matches!(x, '.' | '-' | '_' | '+')
            })
    };

    if !valid(kind) || !valid(subtype) {
        anyhow::bail!("invalid media type '{}'", media_type);
    }
}
