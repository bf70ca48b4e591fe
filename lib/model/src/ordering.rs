use crate::Term;
use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNodeRef};
use std::cmp::Ordering;

const NUMERIC_DATATYPES: [NamedNodeRef<'static>; 16] = [
    xsd::INTEGER,
    xsd::DECIMAL,
    xsd::DOUBLE,
    xsd::FLOAT,
    xsd::INT,
    xsd::LONG,
    xsd::SHORT,
    xsd::BYTE,
    xsd::NON_NEGATIVE_INTEGER,
    xsd::NON_POSITIVE_INTEGER,
    xsd::POSITIVE_INTEGER,
    xsd::NEGATIVE_INTEGER,
    xsd::UNSIGNED_LONG,
    xsd::UNSIGNED_INT,
    xsd::UNSIGNED_SHORT,
    xsd::UNSIGNED_BYTE,
];

/// Returns the numeric value of a literal with a numeric XSD datatype.
pub fn numeric_value(literal: &Literal) -> Option<f64> {
    if !NUMERIC_DATATYPES.contains(&literal.datatype()) {
        return None;
    }
    literal.value().trim().parse().ok()
}

/// Orders terms for sorting and comparison filters.
///
/// The order is total. Resources sort first and are ordered by IRI. Numeric literals follow,
/// ordered by value, then lexical form, then datatype. All other literals come last, ordered by
/// lexical form, then datatype, then language. Equal terms always compare as [Ordering::Equal].
pub fn compare_terms(lhs: &Term, rhs: &Term) -> Ordering {
    match (lhs, rhs) {
        (Term::NamedNode(lhs), Term::NamedNode(rhs)) => lhs.as_str().cmp(rhs.as_str()),
        (Term::NamedNode(_), Term::Literal(_)) => Ordering::Less,
        (Term::Literal(_), Term::NamedNode(_)) => Ordering::Greater,
        (Term::Literal(lhs), Term::Literal(rhs)) => compare_literals(lhs, rhs),
    }
}

/// Orders optional values as [compare_terms] does. Unbound values sort first.
pub fn compare_optional_terms(lhs: Option<&Term>, rhs: Option<&Term>) -> Ordering {
    match (lhs, rhs) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(lhs), Some(rhs)) => compare_terms(lhs, rhs),
    }
}

fn compare_literals(lhs: &Literal, rhs: &Literal) -> Ordering {
    match (numeric_value(lhs), numeric_value(rhs)) {
        (Some(lhs_value), Some(rhs_value)) => lhs_value
            .total_cmp(&rhs_value)
            .then_with(|| compare_lexically(lhs, rhs)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_lexically(lhs, rhs),
    }
}

fn compare_lexically(lhs: &Literal, rhs: &Literal) -> Ordering {
    lhs.value()
        .cmp(rhs.value())
        .then_with(|| lhs.datatype().as_str().cmp(rhs.datatype().as_str()))
        .then_with(|| lhs.language().cmp(&rhs.language()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::NamedNode;

    fn integer(value: &str) -> Term {
        Literal::new_typed_literal(value, xsd::INTEGER).into()
    }

    #[test]
    fn numeric_literals_compare_by_value() {
        assert_eq!(compare_terms(&integer("9"), &integer("10")), Ordering::Less);
        let decimal = Literal::new_typed_literal("9.5", xsd::DECIMAL).into();
        assert_eq!(compare_terms(&decimal, &integer("10")), Ordering::Less);
    }

    #[test]
    fn plain_literals_compare_lexically() {
        let lhs = Literal::new_simple_literal("9").into();
        let rhs = Literal::new_simple_literal("10").into();
        assert_eq!(compare_terms(&lhs, &rhs), Ordering::Greater);
    }

    #[test]
    fn numeric_literals_sort_before_other_literals() {
        let two = integer("2");
        let ten = integer("10");
        let plain = Literal::new_simple_literal("1a").into();
        assert_eq!(compare_terms(&two, &ten), Ordering::Less);
        assert_eq!(compare_terms(&ten, &plain), Ordering::Less);
        assert_eq!(compare_terms(&two, &plain), Ordering::Less);
    }

    #[test]
    fn equal_values_are_ordered_by_lexical_form() {
        let short = integer("1");
        let padded = integer("01");
        assert_eq!(compare_terms(&padded, &short), Ordering::Less);
        assert_eq!(compare_terms(&short, &short), Ordering::Equal);
    }

    #[test]
    fn sorting_mixed_literals_is_consistent() {
        let mut terms = (0..3000)
            .map(|i| match i % 3 {
                0 => integer(&(i / 3).to_string()),
                1 => Literal::new_simple_literal(format!("{}a", i / 3)).into(),
                _ => Literal::new_typed_literal(format!("{}.5", i / 3), xsd::DECIMAL).into(),
            })
            .collect::<Vec<Term>>();
        terms.sort_by(compare_terms);
        for pair in terms.windows(2) {
            assert_ne!(compare_terms(&pair[0], &pair[1]), Ordering::Greater);
        }
        assert_eq!(terms[0], integer("0"));
        assert!(matches!(&terms[1999], Term::Literal(l) if l.datatype() == xsd::DECIMAL));
        assert!(matches!(&terms[2000], Term::Literal(l) if l.value() == "0a"));
    }

    #[test]
    fn resources_sort_before_literals() {
        let node = NamedNode::new_unchecked("http://example.com/z").into();
        assert_eq!(compare_terms(&node, &integer("1")), Ordering::Less);
    }

    #[test]
    fn unbound_sorts_first() {
        assert_eq!(
            compare_optional_terms(None, Some(&integer("1"))),
            Ordering::Less
        );
    }
}
