//! Beneficiary registry collaborator.

/// Answers whether a beneficiary name belongs to a CNPJ.
///
/// Implementations may query an external registry. The validator only
/// consults it once the CNPJ is valid and a name was extracted.
pub trait BeneficiaryRegistry: Send + Sync {
    fn corresponds(&self, name: &str, tax_id: &str) -> bool;
}

/// Registry that accepts every pair it is asked about.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptingRegistry;

impl BeneficiaryRegistry for AcceptingRegistry {
    fn corresponds(&self, _name: &str, _tax_id: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepting_registry() {
        assert!(AcceptingRegistry.corresponds("Acme S.A.", "09516419000175"));
    }
}
