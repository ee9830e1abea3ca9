/// Builds a node from a compact tree notation, for tests.
///
/// `node!((frac (row "a"), "b"))` is the fraction `a/b`. A string literal is a text run,
/// and any other expression is used as is.
#[macro_export]
macro_rules! node {
  ((text $s:expr)) => {
    $crate::node::Node::text_run($s)
  };
  ((vec_name $s:expr)) => {
    $crate::node::Node::new($crate::node::NodeKind::TextRun { text: String::from($s), is_vector_marker: true })
  };
  ((frac $a:tt, $b:tt)) => {
    $crate::node::Node::fraction($crate::row!($a), $crate::row!($b))
  };
  ((pow $a:tt, $b:tt)) => {
    $crate::node::Node::power($crate::row!($a), $crate::row!($b))
  };
  ((sub $a:tt, $b:tt)) => {
    $crate::node::Node::subscript($crate::row!($a), $crate::row!($b))
  };
  ((sqrt $a:tt)) => {
    $crate::node::Node::root($crate::row!($a), None)
  };
  ((root $a:tt, $b:tt)) => {
    $crate::node::Node::root($crate::row!($a), Some($crate::row!($b)))
  };
  ((integral $f:tt, $x:tt)) => {
    $crate::node::Node::integral($crate::row!($f), $crate::row!($x), None)
  };
  ((integral $f:tt, $x:tt, $a:tt, $b:tt)) => {
    $crate::node::Node::integral($crate::row!($f), $crate::row!($x), Some(($crate::row!($a), $crate::row!($b))))
  };
  ((derivative $f:tt, $x:tt)) => {
    $crate::node::Node::derivative($crate::row!($f), $crate::row!($x), 1)
  };
  ((derivative $f:tt, $x:tt, $n:expr)) => {
    $crate::node::Node::derivative($crate::row!($f), $crate::row!($x), $n)
  };
  ((vector $e:tt $(,$es:tt)* $(,)?)) => {
    $crate::node::Node::vector(vec![$crate::row!($e), $($crate::row!($es)),*], false)
  };
  ((column_vector $e:tt $(,$es:tt)* $(,)?)) => {
    $crate::node::Node::vector(vec![$crate::row!($e), $($crate::row!($es)),*], true)
  };
  ((matrix $x:literal x $y:literal $e:tt $(,$es:tt)* $(,)?)) => {{
      let width: usize = $x;
      let height: usize = $y;
      let values = vec![$crate::row!($e), $($crate::row!($es)),*];
      assert!(values.len() == width * height, "Matrix size does not match the values");
      $crate::node::Node::matrix($crate::grid::Grid::from_one_dimensional(values, width))
  }};
  ((comment $s:expr)) => {
    $crate::node::Node::comment($s, false)
  };
  ((closed_comment $s:expr)) => {
    $crate::node::Node::comment($s, true)
  };
  ((title $s:expr)) => {
    $crate::node::Node::title($s)
  };
  ($s:literal) => {
    $crate::node::Node::text_run($s)
  };
  ($s:expr) => {
    $s
  };
}

/// Builds a row, `row!((row "a", (pow "b", "2")))`. A string literal is a row with one text run.
#[macro_export]
macro_rules! row {
  ((row $e:tt $(,$es:tt)* $(,)?)) => {
    $crate::row::Row::new(vec![$crate::node!($e), $($crate::node!($es)),*])
  };
  ($s:literal) => {
    $crate::row::Row::from_text($s)
  };
  ($e:expr) => {
      $e
  };
}
