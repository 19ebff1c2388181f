use proptest::prelude::*;
use vectory_core::index::{check_ind, len_ind, normalize_ind, sub_index, Index, SliceSpec};

fn slice(start: Option<isize>, stop: Option<isize>, step: Option<isize>) -> Index {
    Index::Slice(SliceSpec::new(start, stop, step).unwrap())
}

// Positions selected by `ind`, computed the naive way.
fn select(ind: &Index, len: usize) -> Vec<usize> {
    let wrap = |i: isize| if i < 0 { (i + len as isize) as usize } else { i as usize };
    match ind {
        Index::Int(i) => vec![wrap(*i)],
        Index::Slice(s) => {
            let (start, stop, step) = s.indices(len);
            let mut out = Vec::new();
            let mut i = start;
            while (step > 0 && i < stop) || (step < 0 && i > stop) {
                out.push(i as usize);
                i += step;
            }
            out
        }
        Index::List(l) => l.iter().map(|&i| wrap(i)).collect(),
    }
}

fn valid_index(len: usize) -> BoxedStrategy<Index> {
    let l = len as isize;
    let slices = (
        proptest::option::of(-8isize..8),
        proptest::option::of(-8isize..8),
        proptest::option::of(prop_oneof![-3isize..0, 1isize..4]),
    )
        .prop_map(|(a, b, c)| slice(a, b, c));
    if len == 0 {
        prop_oneof![slices, Just(Index::List(Vec::new()))].boxed()
    } else {
        prop_oneof![
            (-l..l).prop_map(Index::Int),
            slices,
            proptest::collection::vec(-l..l, 0..6).prop_map(Index::List),
        ]
        .boxed()
    }
}

fn nested_indices() -> impl Strategy<Value = (usize, Index, Index)> {
    (0usize..7)
        .prop_flat_map(|len| (Just(len), valid_index(len)))
        .prop_flat_map(|(len, ind)| {
            let n = select(&ind, len).len();
            (Just(len), Just(ind), valid_index(n))
        })
}

proptest! {
    #[test]
    fn sub_index_equals_double_indexing((len, ind, ind_ind) in nested_indices()) {
        prop_assert!(check_ind(&ind, len));
        let first = select(&ind, len);
        let expected: Vec<usize> = select(&ind_ind, first.len()).into_iter().map(|k| first[k]).collect();
        let composed = sub_index(&ind, &ind_ind, len).unwrap();
        prop_assert_eq!(composed.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn normalized_form_selects_the_same((len, ind) in (0usize..7).prop_flat_map(|len| (Just(len), valid_index(len)))) {
        let norm = normalize_ind(&ind, len).unwrap();
        prop_assert_eq!(norm.len(), len_ind(&ind, len));
        prop_assert_eq!(norm.iter().collect::<Vec<_>>(), select(&ind, len));
    }
}
