use crate::layout::{FrameRole, PlaceholderFrame};

/// Indices into a slide's placeholder set, picked by [`resolve_frames`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedFrames {
    pub title: Option<usize>,
    pub body: Option<usize>,
}

/// Selects the title and body frames for a slide.
///
/// Title: the first title-role frame (a centered title counts).
///
/// Body, in priority order:
/// 1. a frame explicitly typed `body`,
/// 2. on the opening slide only, a frame typed `subTitle`,
/// 3. the tallest text-capable frame that is not the title — the visually
///    largest frame is assumed to be the main content area. Frames without
///    pinned geometry count as height 0.
///
/// Either side may come back `None`; missing frames are not an error, the
/// corresponding population step is simply skipped.
pub fn resolve_frames(frames: &[PlaceholderFrame], slide_index: usize) -> ResolvedFrames {
    let title = frames.iter().position(|f| f.role.is_title());

    let mut body = frames.iter().position(|f| f.role == FrameRole::Body);

    if body.is_none() && slide_index == 0 {
        body = frames.iter().position(|f| f.role == FrameRole::Subtitle);
    }

    if body.is_none() {
        body = frames
            .iter()
            .enumerate()
            .filter(|(i, f)| Some(*i) != title && f.role.is_text_capable())
            .max_by_key(|(_, f)| f.frame.map(|r| r.cy).unwrap_or(0))
            .map(|(i, _)| i);
    }

    ResolvedFrames { title, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Rect;

    fn frame(role: FrameRole, height: i64) -> PlaceholderFrame {
        PlaceholderFrame {
            role,
            index: 0,
            name: String::new(),
            frame: Some(Rect {
                x: 0,
                y: 0,
                cx: 1000,
                cy: height,
            }),
        }
    }

    #[test]
    fn explicit_body_wins_over_everything() {
        let frames = vec![
            frame(FrameRole::Title, 500),
            frame(FrameRole::Subtitle, 9000),
            frame(FrameRole::Body, 100),
        ];
        let resolved = resolve_frames(&frames, 0);
        assert_eq!(resolved.title, Some(0));
        assert_eq!(resolved.body, Some(2));
    }

    #[test]
    fn subtitle_is_body_only_on_the_opening_slide() {
        let frames = vec![
            frame(FrameRole::CenteredTitle, 500),
            frame(FrameRole::Subtitle, 800),
        ];
        assert_eq!(resolve_frames(&frames, 0).body, Some(1));

        // On later slides the subtitle is only reachable via the height
        // fallback, which here picks it as the sole non-title candidate.
        assert_eq!(resolve_frames(&frames, 3).body, Some(1));
    }

    #[test]
    fn fallback_picks_the_tallest_non_title_frame() {
        let frames = vec![
            frame(FrameRole::Title, 9999),
            frame(FrameRole::Content, 2000),
            frame(FrameRole::Content, 4000),
        ];
        let resolved = resolve_frames(&frames, 1);
        assert_eq!(resolved.body, Some(2));
    }

    #[test]
    fn frames_without_geometry_count_as_height_zero() {
        let mut tall = frame(FrameRole::Content, 4000);
        tall.frame = None;
        let frames = vec![frame(FrameRole::Title, 500), tall, frame(FrameRole::Content, 1)];
        assert_eq!(resolve_frames(&frames, 1).body, Some(2));
    }

    #[test]
    fn chrome_frames_are_never_body_candidates() {
        let frames = vec![
            frame(FrameRole::Title, 500),
            frame(FrameRole::Footer, 8000),
            frame(FrameRole::SlideNumber, 8000),
        ];
        assert_eq!(resolve_frames(&frames, 1).body, None);
    }

    #[test]
    fn empty_frame_set_resolves_to_nothing() {
        let resolved = resolve_frames(&[], 0);
        assert_eq!(resolved.title, None);
        assert_eq!(resolved.body, None);
    }

    #[test]
    fn missing_title_role_leaves_title_unresolved() {
        let frames = vec![frame(FrameRole::Content, 1000)];
        let resolved = resolve_frames(&frames, 1);
        assert_eq!(resolved.title, None);
        assert_eq!(resolved.body, Some(0));
    }
}
