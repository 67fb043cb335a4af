use ipgate_common::RequestContext;

/// Resolves the caller's address from forwarded headers, falling back to the
/// raw connection address. The header chain comes from config and is checked
/// in order; the first non-empty source decides, and later sources are
/// ignored even if the winning one only contains garbage.
pub struct AddressResolver {
    header_chain: Vec<String>,
}

impl AddressResolver {
    pub fn new(header_chain: Vec<String>) -> Self {
        Self { header_chain }
    }

    /// The caller's address, or `None` when no source had one.
    pub fn resolve(&self, ctx: &RequestContext) -> Option<String> {
        self.resolve_all(ctx).into_iter().next()
    }

    /// All addresses from the winning source, de-duplicated, first-seen
    /// order preserved. Values are opaque strings; no syntax validation.
    pub fn resolve_all(&self, ctx: &RequestContext) -> Vec<String> {
        for name in &self.header_chain {
            if let Some(value) = ctx.header(name) {
                if value.trim().is_empty() {
                    continue;
                }
                let mut list: Vec<String> = Vec::new();
                for entry in value.split(',') {
                    let entry = entry.trim();
                    if !entry.is_empty() && !list.iter().any(|seen| seen == entry) {
                        list.push(entry.to_owned());
                    }
                }
                return list;
            }
        }

        ctx.remote_addr
            .as_deref()
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .map(|addr| vec![addr.to_owned()])
            .unwrap_or_default()
    }
}
