use std::fmt;

/// How a file is sent, chosen once per attempt from its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadStrategy {
    /// One combined request; the backend stores, records and tags.
    Small,
    /// Negotiate an authorization, write directly to storage, then finalize.
    Large,
}

impl UploadStrategy {
    /// `Small` iff `size < threshold`.
    pub fn select(size: u64, threshold: u64) -> Self {
        if size < threshold {
            UploadStrategy::Small
        } else {
            UploadStrategy::Large
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStrategy::Small => "small",
            UploadStrategy::Large => "large",
        }
    }
}

impl fmt::Display for UploadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnisora_core::constants::DEFAULT_LARGE_UPLOAD_THRESHOLD_BYTES;

    #[test]
    fn threshold_boundary_is_strict() {
        let t = DEFAULT_LARGE_UPLOAD_THRESHOLD_BYTES;
        assert_eq!(t, 4_718_592);
        assert_eq!(UploadStrategy::select(t - 1, t), UploadStrategy::Small);
        assert_eq!(UploadStrategy::select(t, t), UploadStrategy::Large);
        assert_eq!(UploadStrategy::select(t + 1, t), UploadStrategy::Large);
    }

    #[test]
    fn scenario_sizes() {
        let t = DEFAULT_LARGE_UPLOAD_THRESHOLD_BYTES;
        assert_eq!(UploadStrategy::select(0, t), UploadStrategy::Small);
        assert_eq!(UploadStrategy::select(1_000_000, t), UploadStrategy::Small);
        assert_eq!(UploadStrategy::select(10_000_000, t), UploadStrategy::Large);
    }

    #[test]
    fn custom_threshold() {
        assert_eq!(UploadStrategy::select(10, 11), UploadStrategy::Small);
        assert_eq!(UploadStrategy::select(11, 11), UploadStrategy::Large);
    }
}
