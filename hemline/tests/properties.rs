use hemline::Error;
use hemline::HemBox;
use proptest::prelude::*;

/// Content without NUL bytes, so plain-slice sources are taken whole.
fn content(max: usize) -> impl Strategy<Value = Vec<u8>> {
  proptest::collection::vec(1u8..=255, 0..max)
}

/// Checks the length and terminator invariants straight from the raw bytes.
fn assert_invariants(hem: &HemBox) -> Result<(), TestCaseError> {
  let raw = hem.as_raw_bytes();
  let with_nul = hem.as_bytes_with_nul();
  prop_assert!(hem.len() <= hem.capacity());
  prop_assert_eq!(with_nul.len(), hem.len() + 1);
  prop_assert_eq!(with_nul.last(), Some(&0));
  prop_assert_eq!(raw.len(), hemline::backing_size(hem.capacity()));
  let payload = &raw[raw.len() - hem.capacity() - 1..];
  prop_assert_eq!(payload.as_ptr(), hem.as_bytes().as_ptr());
  Ok(())
}

#[derive(Clone, Debug)]
enum Op {
  Copy(Vec<u8>),
  Append(Vec<u8>),
  AppendN(Vec<u8>, usize),
  Truncate(usize),
  SetByte(isize, u8),
  Push(u8),
  Insert(Vec<u8>, isize, isize),
  Splice(isize, Vec<u8>, isize, usize),
}

fn op() -> impl Strategy<Value = Op> {
  prop_oneof![
    content(24).prop_map(Op::Copy),
    content(24).prop_map(Op::Append),
    (content(24), 0usize..30).prop_map(|(s, n)| Op::AppendN(s, n)),
    (0usize..30).prop_map(Op::Truncate),
    (-30isize..30, 1u8..=255).prop_map(|(i, b)| Op::SetByte(i, b)),
    (1u8..=255).prop_map(Op::Push),
    (content(24), -30isize..30, -30isize..30)
      .prop_map(|(s, a, b)| Op::Insert(s, a, b)),
    (-30isize..30, content(24), -30isize..30, 0usize..30)
      .prop_map(|(d, s, a, n)| Op::Splice(d, s, a, n)),
  ]
}

proptest! {
  #[test]
  fn mutations_keep_invariants(
    capacity in 1usize..20,
    ops in proptest::collection::vec(op(), 0..40),
  ) {
    let mut hem = HemBox::with_capacity(capacity).unwrap();
    for op in ops {
      let before = hem.clone();
      let result = match &op {
        Op::Copy(s) => hem.copy_from(&s[..]),
        Op::Append(s) => hem.append(&s[..]),
        Op::AppendN(s, n) => hem.append_n(&s[..], *n),
        Op::Truncate(n) => hem.truncate(*n),
        Op::SetByte(i, b) => hem.set_byte_at(*i, *b, b'.'),
        Op::Push(b) => hem.push_byte(*b),
        Op::Insert(s, a, b) => hem.insert(&s[..], *a, *b, b'.'),
        Op::Splice(d, s, a, n) => hem.splice(*d, &s[..], *a, *n, b'.'),
      };

      assert_invariants(&hem)?;
      prop_assert_eq!(hem.capacity(), capacity);
      if result.is_err() {
        prop_assert_eq!(hem.as_raw_bytes(), before.as_raw_bytes(), "{:?}", op);
      }
    }
  }

  #[test]
  fn duplicate_is_independent(src in content(64)) {
    prop_assume!(!src.is_empty());
    let original = HemBox::duplicate(&src[..]).unwrap();
    let mut copy = HemBox::duplicate(&original).unwrap();

    prop_assert_eq!(copy.len(), original.len());
    prop_assert_eq!(copy.as_bytes(), original.as_bytes());

    copy.set_byte_at(0, 0, b' ').unwrap();
    prop_assert_eq!(original.as_bytes(), &src[..]);
  }

  #[test]
  fn truncate_past_len_is_idempotent(src in content(32), extra in 0usize..8) {
    let mut hem = HemBox::duplicate_at_least(&src[..], 1).unwrap();
    let before = hem.clone();
    let len = hem.len();

    prop_assert_eq!(hem.truncate(len + extra), Ok(len));
    prop_assert_eq!(hem.as_raw_bytes(), before.as_raw_bytes());
  }

  #[test]
  fn push_byte_at_capacity_fails(src in content(32)) {
    prop_assume!(!src.is_empty());
    let mut hem = HemBox::duplicate(&src[..]).unwrap();

    prop_assert_eq!(hem.push_byte(b'!'), Err(Error::OutOfRange));
    prop_assert_eq!(hem.as_bytes(), &src[..]);
  }

  #[test]
  fn negative_indices_mirror_positive(src in content(32), i in 0usize..32) {
    prop_assume!(!src.is_empty());
    let hem = HemBox::duplicate(&src[..]).unwrap();
    let len = hem.len() as isize;

    prop_assert_eq!(hem.byte_at(-1), hem.byte_at(len - 1));
    if (i as isize) < len {
      prop_assert_eq!(hem.byte_at(i as isize - len), hem.byte_at(i as isize));
    }
    prop_assert_eq!(hem.byte_at(len), None);
    prop_assert_eq!(hem.byte_at(-len - 1), None);
  }

  #[test]
  fn found_substrings_match(hay in content(40), start in 0usize..40, len in 1usize..6) {
    prop_assume!(start + len <= hay.len());
    let needle = &hay[start..start + len];
    let found = hemline::search::find(&hay[..], needle, 0).unwrap();

    prop_assert!(found <= start);
    prop_assert_eq!(&hay[found..found + len], needle);
  }
}
