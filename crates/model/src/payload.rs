use anyhow::Context;

/// Checks that a file holds exactly `header` bytes followed by `items`
/// values of `size` bytes each, before anything sized by the header is
/// allocated. Header counts come from untrusted files.
pub(crate) fn ensure_payload(path: &std::path::Path, header: u64, items: Option<u64>, size: u64) -> anyhow::Result<()> {
    let actual = std::fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .len();
    let expected = items
        .and_then(|n| n.checked_mul(size))
        .and_then(|n| n.checked_add(header));
    match expected {
        Some(expected) => anyhow::ensure!(
            actual == expected,
            "{} holds {} bytes but its header describes {}",
            path.display(),
            actual,
            expected
        ),
        None => anyhow::bail!("{} has a header describing an impossible payload", path.display()),
    }
    Ok(())
}
