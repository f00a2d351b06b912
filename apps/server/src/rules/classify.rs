/// The semantic category a catalog entry belongs to. Derived, never stored
/// as the source of truth for pricing/availability decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Walk,
    DropIn,
    OvernightBoarding,
    OvernightSitting,
    AddOn,
    Other,
}

impl ServiceType {
    pub fn is_overnight(self) -> bool {
        matches!(self, Self::OvernightBoarding | Self::OvernightSitting)
    }

    /// Upper bound on pets per booking, where one applies.
    pub fn max_pets(self) -> Option<u32> {
        match self {
            Self::Walk => Some(2),
            Self::OvernightBoarding | Self::OvernightSitting => Some(4),
            _ => None,
        }
    }
}

/// Substrings (lowercase) that mark an add-on service.
const ADDON_SIGNALS: &[&str] = &[
    "administration of meds",
    "vet",
    "pick up",
    "pickup",
    "drop off",
    "drop-off",
    "add-on",
    "addon",
];

/// Classify a service by its display name. Case-insensitive, first match
/// wins, total: any string maps to exactly one type.
///
/// This is the compatibility shim for catalogs without a stored type tag;
/// prefer [`from_tag`] when the row carries one. Confusable names (two
/// entries matching the same rule prefix) are a latent catalog bug.
pub fn classify(name: &str) -> ServiceType {
    let n = name.trim().to_lowercase();
    if n.starts_with("dog walk") {
        return ServiceType::Walk;
    }
    if n.starts_with("drop-in") || n.starts_with("drop in") || n.starts_with("potty break") {
        return ServiceType::DropIn;
    }
    if n.starts_with("boarding") {
        return ServiceType::OvernightBoarding;
    }
    if n.starts_with("sitting") {
        return ServiceType::OvernightSitting;
    }
    if ADDON_SIGNALS.iter().any(|sig| n.contains(sig)) {
        return ServiceType::AddOn;
    }
    ServiceType::Other
}

/// Resolve a stored `service_type` tag. Unknown tags fall through to name
/// classification at the call site.
pub fn from_tag(tag: &str) -> Option<ServiceType> {
    match tag {
        "walk" => Some(ServiceType::Walk),
        "dropin" => Some(ServiceType::DropIn),
        "boarding" => Some(ServiceType::OvernightBoarding),
        "sitting" => Some(ServiceType::OvernightSitting),
        "addon" => Some(ServiceType::AddOn),
        "other" => Some(ServiceType::Other),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_prefix() {
        assert_eq!(classify("Dog Walk (30 min)"), ServiceType::Walk);
        assert_eq!(classify("dog walk"), ServiceType::Walk);
    }

    #[test]
    fn test_dropin_prefixes() {
        assert_eq!(classify("Drop-in (20 min)"), ServiceType::DropIn);
        assert_eq!(classify("Drop in visit"), ServiceType::DropIn);
        assert_eq!(classify("Potty Break"), ServiceType::DropIn);
    }

    #[test]
    fn test_overnight_prefixes() {
        assert_eq!(
            classify("Boarding (overnight, our home)"),
            ServiceType::OvernightBoarding
        );
        assert_eq!(
            classify("Sitting (overnight, pet parent's home)"),
            ServiceType::OvernightSitting
        );
    }

    #[test]
    fn test_addon_signals() {
        assert_eq!(classify("Administration of Meds"), ServiceType::AddOn);
        assert_eq!(classify("Transport: pick up / drop off"), ServiceType::AddOn);
        assert_eq!(classify("Vet visit escort"), ServiceType::AddOn);
    }

    #[test]
    fn test_other_fallback() {
        assert_eq!(classify("Grooming"), ServiceType::Other);
        assert_eq!(classify(""), ServiceType::Other);
    }

    #[test]
    fn test_precedence_prefix_beats_addon_substring() {
        // "pick up" appears in the name, but the walk prefix wins.
        assert_eq!(classify("Dog Walk with pick up"), ServiceType::Walk);
        // Boarding prefix wins over a "vet" mention later in the name.
        assert_eq!(
            classify("Boarding near the vet clinic"),
            ServiceType::OvernightBoarding
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("DOG WALK (60 MIN)"), ServiceType::Walk);
        assert_eq!(classify("ADD-ON: extra playtime"), ServiceType::AddOn);
    }

    #[test]
    fn test_stored_tag_roundtrip() {
        assert_eq!(from_tag("walk"), Some(ServiceType::Walk));
        assert_eq!(from_tag("dropin"), Some(ServiceType::DropIn));
        assert_eq!(from_tag("boarding"), Some(ServiceType::OvernightBoarding));
        assert_eq!(from_tag("sitting"), Some(ServiceType::OvernightSitting));
        assert_eq!(from_tag("addon"), Some(ServiceType::AddOn));
        assert_eq!(from_tag("legacy"), None);
    }

    #[test]
    fn test_pet_caps() {
        assert_eq!(ServiceType::Walk.max_pets(), Some(2));
        assert_eq!(ServiceType::OvernightBoarding.max_pets(), Some(4));
        assert_eq!(ServiceType::DropIn.max_pets(), None);
    }
}
