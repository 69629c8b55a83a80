//! Scene/platform gate deciding whether an export is patched at all.

use exportfix_types::report::GateVerdict;
use exportfix_types::{BuildContext, Platform};
use tracing::debug;

/// Scene that must be enabled in the build for post-processing to run.
pub const REQUIRED_SCENE: &str = "Assets/Scenes/CounterScene.unity";

/// Only iOS exports carry the Xcode project this tool rewrites.
pub const REQUIRED_PLATFORM: Platform = Platform::Ios;

/// True iff `required_scene_path` appears anywhere in `active_scene_paths`.
pub fn is_eligible(active_scene_paths: &[String], required_scene_path: &str) -> bool {
    active_scene_paths.iter().any(|p| p == required_scene_path)
}

pub fn evaluate(ctx: &BuildContext) -> GateVerdict {
    let verdict = if ctx.platform != REQUIRED_PLATFORM {
        GateVerdict::SkippedPlatform
    } else if !is_eligible(&ctx.active_scene_paths, REQUIRED_SCENE) {
        GateVerdict::SkippedScene
    } else {
        GateVerdict::Eligible
    };
    debug!(
        platform = %ctx.platform,
        scenes = ctx.active_scene_paths.len(),
        ?verdict,
        "evaluated gate"
    );
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ctx(platform: Platform, scenes: &[&str]) -> BuildContext {
        BuildContext::new(
            platform,
            "build/ios",
            scenes.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn eligible_when_ios_and_scene_enabled() {
        let c = ctx(Platform::Ios, &["Assets/Scenes/Menu.unity", REQUIRED_SCENE]);
        assert_eq!(evaluate(&c), GateVerdict::Eligible);
    }

    #[test]
    fn other_platforms_are_skipped_first() {
        let c = ctx(Platform::Android, &[REQUIRED_SCENE]);
        assert_eq!(evaluate(&c), GateVerdict::SkippedPlatform);
    }

    #[test]
    fn missing_scene_is_skipped() {
        let c = ctx(Platform::Ios, &["Assets/Scenes/Menu.unity"]);
        assert_eq!(evaluate(&c), GateVerdict::SkippedScene);
        assert_eq!(evaluate(&ctx(Platform::Ios, &[])), GateVerdict::SkippedScene);
    }

    #[test]
    fn scene_match_is_exact() {
        let scenes = vec![
            "assets/scenes/counterscene.unity".to_string(),
            "Assets/Scenes/CounterScene.unity.meta".to_string(),
        ];
        assert!(!is_eligible(&scenes, REQUIRED_SCENE));
    }

    proptest! {
        #[test]
        fn eligible_iff_member(
            mut scenes in prop::collection::vec("[A-Za-z/]{1,12}\\.unity", 0..8),
            include in any::<bool>(),
            position in any::<prop::sample::Index>(),
            duplicate in any::<bool>(),
        ) {
            scenes.retain(|s| s != REQUIRED_SCENE);
            if include {
                let at = position.index(scenes.len() + 1);
                scenes.insert(at, REQUIRED_SCENE.to_string());
                if duplicate {
                    scenes.push(REQUIRED_SCENE.to_string());
                }
            }
            prop_assert_eq!(is_eligible(&scenes, REQUIRED_SCENE), include);
        }
    }
}
