//! Strategy legality.

use strata_types::{ImpactType, ResolutionChoice};

/// The resolution choices legal for an impact type.
///
/// - `Conflict`: an operator picks a side or supplies a merged value;
///   auto-merge is never legal once a conflict exists.
/// - `OverrideAffected` / `ExtensionAffected`: any strategy, auto-merge
///   being the suggested one.
/// - `Deprecated`: keep the customization for now or revert to the
///   (deprecated) platform value; merging into a resource scheduled to
///   disappear is not offered.
/// - `Removed`: the resource no longer exists upstream, so the only legal
///   outcome is accepting the removal.
/// - `NewAvailable`: adopt the platform resource as-is or customize it
///   immediately.
pub fn allowed_choices(impact_type: ImpactType) -> &'static [ResolutionChoice] {
    use ResolutionChoice::*;

    match impact_type {
        ImpactType::Conflict => &[UsePlatform, KeepTenant, CustomMerge],
        ImpactType::OverrideAffected | ImpactType::ExtensionAffected => {
            &[AutoMerge, UsePlatform, KeepTenant, CustomMerge]
        }
        ImpactType::Deprecated => &[UsePlatform, KeepTenant],
        ImpactType::Removed => &[UsePlatform],
        ImpactType::NewAvailable => &[UsePlatform, CustomMerge],
    }
}

/// Returns `true` if `choice` is legal for `impact_type`.
pub fn is_allowed(impact_type: ImpactType, choice: ResolutionChoice) -> bool {
    allowed_choices(impact_type).contains(&choice)
}
