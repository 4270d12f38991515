//! `(AssetClass, BuildProfile)` -> ordered step list.

use super::step::Step;
use crate::asset::AssetClass;
use crate::core::BuildProfile;

pub const BUNDLE_NAME: &str = "bundle.js";

const MARKUP_SOFT: &[Step] = &[Step::ResolveIncludes {
    expose_profile: false,
}];
const MARKUP_HARD: &[Step] = &[Step::ResolveIncludes {
    expose_profile: true,
}];
const SASS_SOFT: &[Step] = &[Step::CompileSass];
const SASS_HARD: &[Step] = &[Step::CompileSass, Step::Autoprefix, Step::MinifyCss];
const CSS_HARD: &[Step] = &[Step::MinifyCss];
const SCRIPT_HARD: &[Step] = &[
    Step::TranspileJs,
    Step::MinifyJs,
    Step::Concat { name: BUNDLE_NAME },
];
const IMAGE_SOFT: &[Step] = &[Step::OptimizeImage];
const IMAGE_HARD: &[Step] = &[Step::ConvertWebp, Step::OptimizeImage];

/// Steps for one class under one profile. An empty list copies files as-is.
pub const fn steps_for(class: AssetClass, profile: BuildProfile) -> &'static [Step] {
    match (class, profile) {
        (AssetClass::Markup, BuildProfile::Soft) => MARKUP_SOFT,
        (AssetClass::Markup, BuildProfile::Hard) => MARKUP_HARD,
        (AssetClass::Sass, BuildProfile::Soft) => SASS_SOFT,
        (AssetClass::Sass, BuildProfile::Hard) => SASS_HARD,
        (AssetClass::Css, BuildProfile::Soft) => &[],
        (AssetClass::Css, BuildProfile::Hard) => CSS_HARD,
        (AssetClass::Script, BuildProfile::Soft) => &[],
        (AssetClass::Script, BuildProfile::Hard) => SCRIPT_HARD,
        (AssetClass::Image, BuildProfile::Soft) => IMAGE_SOFT,
        (AssetClass::Image, BuildProfile::Hard) => IMAGE_HARD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_copies() {
        assert!(steps_for(AssetClass::Css, BuildProfile::Soft).is_empty());
        assert!(steps_for(AssetClass::Script, BuildProfile::Soft).is_empty());
    }

    #[test]
    fn test_hard_scripts_end_in_bundle() {
        let steps = steps_for(AssetClass::Script, BuildProfile::Hard);
        assert_eq!(steps.last(), Some(&Step::Concat { name: "bundle.js" }));
    }

    #[test]
    fn test_images_optimized_under_both() {
        for profile in [BuildProfile::Soft, BuildProfile::Hard] {
            let steps = steps_for(AssetClass::Image, profile);
            assert_eq!(steps.last(), Some(&Step::OptimizeImage));
        }
        assert!(!steps_for(AssetClass::Image, BuildProfile::Soft).contains(&Step::ConvertWebp));
        assert!(steps_for(AssetClass::Image, BuildProfile::Hard).contains(&Step::ConvertWebp));
    }

    #[test]
    fn test_only_hard_markup_exposes_profile() {
        assert_eq!(
            steps_for(AssetClass::Markup, BuildProfile::Soft),
            [Step::ResolveIncludes { expose_profile: false }]
        );
        assert_eq!(
            steps_for(AssetClass::Markup, BuildProfile::Hard),
            [Step::ResolveIncludes { expose_profile: true }]
        );
    }
}
