use crate::error::AppError;

/// Scans the leading base-10 digits of `input`.
///
/// Returns the parsed value and the unconsumed remainder, which callers use to
/// locate a following `/`-delimited operand. Fails when `input` does not start
/// with a digit. Values beyond `i32::MAX` saturate.
pub fn parse_numeric(input: &str) -> Result<(i32, &str), AppError> {
    let end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());

    if end == 0 {
        return Err(AppError::MalformedOperand(format!(
            "expected a number at {input:?}"
        )));
    }

    let (digits, rest) = input.split_at(end);
    // only overflow can fail here, the slice is all digits
    let value = digits.parse::<i32>().unwrap_or(i32::MAX);

    Ok((value, rest))
}

pub fn parse_pair(input: &str) -> Result<(i32, i32), AppError> {
    let (first, rest) = parse_numeric(input)?;
    // any single delimiter is accepted between the operands
    let mut chars = rest.chars();
    if chars.next().is_none() {
        return Err(AppError::MalformedOperand(
            "missing second operand".into(),
        ));
    }
    let (second, _) = parse_numeric(chars.as_str())?;

    Ok((first, second))
}
