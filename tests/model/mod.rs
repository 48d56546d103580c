//! Model building, checked by evaluating solutions.
use std::collections::BTreeMap;

use proptest::prelude::*;

use colgen::data::linear_program::elements::VariableType;
use colgen::data::linear_program::ip::IntegerProgram;
use colgen::data::linear_program::sum::Sum;

const NUM_BOOLEANS: usize = 5;

proptest! {
    #[test]
    fn products(factors in proptest::collection::btree_set(0..NUM_BOOLEANS, 2..=4)) {
        let mut ip = IntegerProgram::new();
        let variables = (0..NUM_BOOLEANS).map(|_| ip.add_boolean(0.0)).collect::<Vec<_>>();
        let indices = factors.iter().map(|&i| variables[i].index()).collect::<Vec<_>>();

        let product = ip.linearize_pseudoboolean_term(&indices).unwrap();
        let reversed = indices.iter().rev().copied().collect::<Vec<_>>();
        let reversed_product = ip.linearize_pseudoboolean_term(&reversed).unwrap();
        prop_assert_eq!(reversed_product.terms(), product.terms());
        prop_assert_eq!(product.terms().len(), 1);
        let helper = product.terms()[0].0;
        prop_assert!(ip.variables()[helper].is_helper);

        for assignment in 0..1_u32 << NUM_BOOLEANS {
            for value in [0, 1] {
                for (i, variable) in variables.iter().enumerate() {
                    ip.set_solution(variable.index(), f64::from((assignment >> i) & 1)).unwrap();
                }
                ip.set_solution(helper, f64::from(value)).unwrap();

                let all_set = factors.iter().all(|&i| (assignment >> i) & 1 == 1);
                prop_assert_eq!(ip.is_feasible(1e-9), all_set == (value == 1));
            }
        }
    }

    #[test]
    fn normalization(
        terms in proptest::collection::vec((0..4_usize, -3..=3_i32), 0..8),
        constant in -2..=2_i32,
    ) {
        let mut ip = IntegerProgram::new();
        let variables = (0..4).map(|_| ip.add_variable(VariableType::Real, 0.0)).collect::<Vec<_>>();

        let mut sum = Sum::from(f64::from(constant));
        let mut aggregated = BTreeMap::new();
        for &(i, coefficient) in &terms {
            sum += variables[i] * f64::from(coefficient);
            *aggregated.entry(variables[i].index()).or_insert(0) += coefficient;
        }
        let expected = aggregated.into_iter()
            .filter(|&(_, coefficient)| coefficient != 0)
            .map(|(index, coefficient)| (index, f64::from(coefficient)))
            .collect::<Vec<_>>();

        let upper = 10.0;
        let dual = ip.add_constraint(f64::NEG_INFINITY, &sum, upper).unwrap();
        match expected.as_slice() {
            [] => {
                prop_assert_eq!(dual.row(), None);
                prop_assert!(ip.rows().is_empty());
            },
            &[(index, coefficient)] => {
                prop_assert_eq!(dual.row(), None);
                prop_assert!(ip.rows().is_empty());
                let bound = (upper - f64::from(constant)) / coefficient;
                let variable = &ip.variables()[index];
                if coefficient > 0.0 {
                    prop_assert_eq!(variable.upper, bound);
                } else {
                    prop_assert_eq!(variable.lower, bound);
                }
            },
            _ => {
                prop_assert_eq!(ip.rows().len(), 1);
                let row = &ip.rows()[0];
                prop_assert_eq!(&row.entries, &expected);
                prop_assert_eq!(row.upper, upper - f64::from(constant));
                prop_assert_eq!(row.lower, f64::NEG_INFINITY);
                prop_assert_eq!(dual.row(), Some(0));
            },
        }
    }
}
