/// Combines the class-level default rollback flag with a method-level override
#[derive(Debug, Clone, Copy, Default)]
pub struct RollbackPolicyResolver;

impl RollbackPolicyResolver {
    /// The override, when present, always wins over the class default
    pub fn decide(default_rollback: bool, method_override: Option<bool>) -> bool {
        method_override.unwrap_or(default_rollback)
    }
}
