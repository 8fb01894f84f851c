//! Credit-card number detection
//!
//! A string is treated as a card number when, after stripping every
//! non-digit character, at least one known brand claims its prefix AND that
//! brand allows the exact digit count. Prefix-only matches with the wrong
//! length (e.g. a 10-digit string starting with 4) are not card numbers,
//! which keeps ordinary account numbers out of the card-masking path.

/// Inclusive numeric prefix rule. Ranges compare the leading digits of the
/// candidate against same-width bounds.
enum Prefix {
    Exact(&'static str),
    Range(u32, u32),
}

struct Brand {
    #[allow(dead_code)]
    name: &'static str,
    prefixes: &'static [Prefix],
    lengths: &'static [usize],
}

const BRANDS: &[Brand] = &[
    Brand {
        name: "visa",
        prefixes: &[Prefix::Exact("4")],
        lengths: &[16, 18, 19],
    },
    Brand {
        name: "mastercard",
        prefixes: &[Prefix::Range(51, 55), Prefix::Range(2221, 2720)],
        lengths: &[16],
    },
    Brand {
        name: "american-express",
        prefixes: &[Prefix::Exact("34"), Prefix::Exact("37")],
        lengths: &[15],
    },
    Brand {
        name: "diners-club",
        prefixes: &[
            Prefix::Range(300, 305),
            Prefix::Exact("36"),
            Prefix::Exact("38"),
            Prefix::Exact("39"),
        ],
        lengths: &[14, 16, 19],
    },
    Brand {
        name: "discover",
        prefixes: &[
            Prefix::Exact("6011"),
            Prefix::Range(644, 649),
            Prefix::Exact("65"),
        ],
        lengths: &[16, 19],
    },
    Brand {
        name: "jcb",
        prefixes: &[
            Prefix::Exact("2131"),
            Prefix::Exact("1800"),
            Prefix::Range(3528, 3589),
        ],
        lengths: &[16, 17, 18, 19],
    },
    Brand {
        name: "unionpay",
        prefixes: &[Prefix::Exact("62"), Prefix::Exact("81")],
        lengths: &[14, 15, 16, 17, 18, 19],
    },
    Brand {
        name: "maestro",
        prefixes: &[
            Prefix::Exact("493698"),
            Prefix::Range(500000, 504174),
            Prefix::Range(504176, 506698),
            Prefix::Range(506779, 508999),
            Prefix::Range(56, 59),
            Prefix::Exact("63"),
            Prefix::Exact("67"),
        ],
        lengths: &[12, 13, 14, 15, 16, 17, 18, 19],
    },
    Brand {
        name: "mir",
        prefixes: &[Prefix::Range(2200, 2204)],
        lengths: &[16, 17, 18, 19],
    },
];

fn decimal_width(mut n: u32) -> usize {
    let mut width = 1;
    while n >= 10 {
        n /= 10;
        width += 1;
    }
    width
}

fn prefix_matches(digits: &str, prefix: &Prefix) -> bool {
    match prefix {
        Prefix::Exact(p) => digits.starts_with(p),
        Prefix::Range(lo, hi) => {
            let width = decimal_width(*lo);
            if digits.len() < width {
                return false;
            }
            match digits[..width].parse::<u32>() {
                Ok(head) => *lo <= head && head <= *hi,
                Err(_) => false,
            }
        }
    }
}

/// Whether `value` is a credit-card number per the brand table above.
///
/// Separator characters (spaces, dashes, anything non-digit) are ignored for
/// detection; masking preserves them.
pub fn is_credit_card(value: &str) -> bool {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return false;
    }
    BRANDS.iter().any(|brand| {
        brand.lengths.contains(&digits.len())
            && brand.prefixes.iter().any(|p| prefix_matches(&digits, p))
    })
}
