use crate::action::Action;

/// Labels for the start, middle and end of the timeline's x axis
pub fn axis_labels(bounds: [f64; 2]) -> [String; 3] {
    let [start, end] = bounds;
    [
        format_label(start),
        format_label((start + end) / 2.0),
        format_label(end),
    ]
}

/// Lane names bottom to top, matching `Action::lane`
pub fn lane_labels() -> [&'static str; 3] {
    let mut lanes = Action::ALL;
    lanes.sort_by(|a, b| a.lane().total_cmp(&b.lane()));
    lanes.map(|a| match a {
        Action::Attack => "ATTACK",
        Action::Axe => "AXE",
        Action::Mace => "MACE",
    })
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_labels() {
        assert_eq!(axis_labels([0.0, 250.0]), ["0", "125", "250"]);
        assert_eq!(axis_labels([10.0, 15.0]), ["10", "12.5", "15"]);
    }

    #[test]
    fn test_lane_labels() {
        assert_eq!(lane_labels(), ["MACE", "AXE", "ATTACK"]);
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.2");
    }
}
