use narrowfp::launch::{LaunchLimits, validate_dims};

pub fn run(
    global: &[usize],
    local: &[usize],
    max_x: Option<usize>,
    max_yz: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let defaults = LaunchLimits::default();
    let limits = LaunchLimits {
        max_x: max_x.unwrap_or(defaults.max_x),
        max_yz: max_yz.unwrap_or(defaults.max_yz),
    };

    validate_dims(global, local, &limits)?;

    let groups: Vec<String> = global
        .iter()
        .zip(local)
        .map(|(g, l)| (g / l).to_string())
        .collect();
    println!("work-groups: [{}]", groups.join(", "));
    println!("nd-range is within limits (x <= {}, y/z <= {})", limits.max_x, limits.max_yz);
    Ok(())
}
