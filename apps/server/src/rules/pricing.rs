use super::classify::ServiceType;

/// Boarding: flat nightly rate plus a per-extra-dog fee, capped at 3 extras.
const BOARDING_BASE_CENTS: i64 = 2500;
const BOARDING_EXTRA_CENTS: i64 = 1800;
const BOARDING_MAX_EXTRAS: i64 = 3;

/// Sitting (at the pet parent's home): nightly rate plus uncapped extras.
const SITTING_BASE_CENTS: i64 = 3000;
const SITTING_EXTRA_CENTS: i64 = 2300;

/// Two-dog walk prices replace the base entirely, keyed by duration tier.
const WALK_TWO_DOG_20: i64 = 2550;
const WALK_TWO_DOG_30: i64 = 3900;
const WALK_TWO_DOG_60: i64 = 4800;

/// Walk duration tier, read from the catalog's duration and falling back to
/// the "(20 min)" style name tag older catalog entries carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkTier {
    Min20,
    Min30,
    Min60,
}

impl WalkTier {
    pub fn from_service(duration_min: i64, name: &str) -> Option<Self> {
        match duration_min {
            20 => return Some(Self::Min20),
            30 => return Some(Self::Min30),
            60 => return Some(Self::Min60),
            _ => {}
        }
        if name.contains("(20") {
            Some(Self::Min20)
        } else if name.contains("(30") {
            Some(Self::Min30)
        } else if name.contains("(60") {
            Some(Self::Min60)
        } else {
            None
        }
    }

    fn two_dog_cents(self) -> i64 {
        match self {
            Self::Min20 => WALK_TWO_DOG_20,
            Self::Min30 => WALK_TWO_DOG_30,
            Self::Min60 => WALK_TWO_DOG_60,
        }
    }
}

/// Total price in cents for a booking. No floats anywhere in this path;
/// dollars only exist at display time.
///
/// `addon_cents` are the flat surcharges for selected add-on services, each
/// applied once on top of the computed base.
pub fn compute_total(
    service_type: ServiceType,
    base_cents: i64,
    pet_count: u32,
    walk_tier: Option<WalkTier>,
    addon_cents: &[i64],
) -> i64 {
    let pets = i64::from(pet_count);
    let extras = (pets - 1).max(0);
    let core = match service_type {
        ServiceType::Walk => {
            if pets <= 1 {
                base_cents
            } else {
                // Two-dog walks use a fixed override, not base plus a delta.
                walk_tier.map_or(base_cents, WalkTier::two_dog_cents)
            }
        }
        ServiceType::OvernightBoarding => {
            BOARDING_BASE_CENTS + BOARDING_EXTRA_CENTS * extras.min(BOARDING_MAX_EXTRAS)
        }
        ServiceType::OvernightSitting => SITTING_BASE_CENTS + SITTING_EXTRA_CENTS * extras,
        ServiceType::DropIn | ServiceType::AddOn | ServiceType::Other => base_cents,
    };
    core + addon_cents.iter().sum::<i64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_single_dog_uses_base() {
        let total = compute_total(ServiceType::Walk, 2200, 1, Some(WalkTier::Min30), &[]);
        assert_eq!(total, 2200);
    }

    #[test]
    fn test_walk_two_dog_override_ignores_base() {
        for base in [0, 1700, 99999] {
            let total = compute_total(ServiceType::Walk, base, 2, Some(WalkTier::Min20), &[]);
            assert_eq!(total, 2550);
        }
        assert_eq!(
            compute_total(ServiceType::Walk, 2200, 2, Some(WalkTier::Min30), &[]),
            3900
        );
        assert_eq!(
            compute_total(ServiceType::Walk, 3200, 2, Some(WalkTier::Min60), &[]),
            4800
        );
    }

    #[test]
    fn test_walk_unknown_tier_falls_back_to_base() {
        assert_eq!(compute_total(ServiceType::Walk, 2200, 2, None, &[]), 2200);
    }

    #[test]
    fn test_boarding_extra_dog_fee() {
        assert_eq!(compute_total(ServiceType::OvernightBoarding, 0, 1, None, &[]), 2500);
        assert_eq!(compute_total(ServiceType::OvernightBoarding, 0, 2, None, &[]), 4300);
        assert_eq!(compute_total(ServiceType::OvernightBoarding, 0, 4, None, &[]), 7900);
    }

    #[test]
    fn test_boarding_monotone_and_capped_at_three_extras() {
        let mut prev = 0;
        for pets in 1..=8 {
            let total = compute_total(ServiceType::OvernightBoarding, 0, pets, None, &[]);
            assert!(total >= prev);
            prev = total;
        }
        // Flat once extras exceed 3.
        assert_eq!(
            compute_total(ServiceType::OvernightBoarding, 0, 5, None, &[]),
            compute_total(ServiceType::OvernightBoarding, 0, 4, None, &[])
        );
    }

    #[test]
    fn test_sitting_uncapped_extras() {
        assert_eq!(compute_total(ServiceType::OvernightSitting, 0, 1, None, &[]), 3000);
        assert_eq!(compute_total(ServiceType::OvernightSitting, 0, 3, None, &[]), 7600);
        assert_eq!(compute_total(ServiceType::OvernightSitting, 0, 6, None, &[]), 14500);
    }

    #[test]
    fn test_flat_types_ignore_pet_count() {
        assert_eq!(compute_total(ServiceType::DropIn, 1500, 3, None, &[]), 1500);
        assert_eq!(compute_total(ServiceType::AddOn, 700, 2, None, &[]), 700);
        assert_eq!(compute_total(ServiceType::Other, 4200, 9, None, &[]), 4200);
    }

    #[test]
    fn test_addon_surcharges_stack() {
        let total = compute_total(ServiceType::Walk, 2200, 1, Some(WalkTier::Min30), &[500, 700]);
        assert_eq!(total, 3400);
    }

    #[test]
    fn test_walk_tier_from_duration_then_name() {
        assert_eq!(WalkTier::from_service(20, "Dog Walk"), Some(WalkTier::Min20));
        assert_eq!(WalkTier::from_service(0, "Dog Walk (30 min)"), Some(WalkTier::Min30));
        assert_eq!(WalkTier::from_service(45, "Dog Walk (60 min)"), Some(WalkTier::Min60));
        assert_eq!(WalkTier::from_service(45, "Dog Walk"), None);
    }
}
