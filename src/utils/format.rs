//! Digit grouping for the counts shown on stderr.

/// Group the digits of a hit, bucket or reject count in threes.
///
/// ```
/// use nro_reject_tools::utils::format::format_number;
///
/// assert_eq!(format_number(65000), "65,000");
/// assert_eq!(format_number(7), "7");
/// ```
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let head = match digits.len() % 3 {
        0 => 3,
        rem => rem,
    };

    let (first, rest) = digits.split_at(head.min(digits.len()));
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    grouped.push_str(first);
    for group in rest.as_bytes().chunks(3) {
        grouped.push(',');
        grouped.extend(group.iter().map(|&b| char::from(b)));
    }
    grouped
}
