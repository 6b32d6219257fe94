use crate::solver::{SliceLike, SliceRef, Operator};
use crate::LinAlgEx;

//

/// Matrix operator
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
/// 
/// Dense matrix struct which borrows a slice of column-major data array and implements [`Operator`].
#[derive(Debug)]
pub struct MatOp<'a, L: LinAlgEx>
{
    n_row: usize,
    n_col: usize,
    array: SliceRef<'a, L::Sl>
}

impl<'a, L: LinAlgEx> MatOp<'a, L>
{
    /// Creates an instance
    /// 
    /// Returns [`MatOp`] instance.
    /// * `(n_row, n_col)`: matrix size.
    /// * `array`: data array slice.
    ///   Column-major matrix data shall be stored.
    pub fn new((n_row, n_col): (usize, usize), array: &'a[L::F]) -> Self
    {
        assert_eq!(n_row * n_col, array.len());

        MatOp {
            n_row,
            n_col,
            array: L::Sl::new_ref(array)
        }
    }

    fn op_impl(&self, transpose: bool, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        if self.n_row > 0 && self.n_col > 0 {
            L::transform_ge(transpose, self.n_row, self.n_col, alpha, &self.array, x, beta, y)
        }
        else {
            L::scale(beta, y);
        }
    }
}

impl<'a, L: LinAlgEx> Operator<L> for MatOp<'a, L>
{
    fn size(&self) -> (usize, usize)
    {
        (self.n_row, self.n_col)
    }

    fn op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        self.op_impl(false, alpha, x, beta, y);
    }

    fn trans_op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        self.op_impl(true, alpha, x, beta, y);
    }
}

impl<'a, L: LinAlgEx> AsRef<[L::F]> for MatOp<'a, L>
{
    fn as_ref(&self) -> &[L::F]
    {
        self.array.get_ref()
    }
}

//

#[test]
fn test_matop1()
{
    use float_eq::assert_float_eq;
    use crate::FloatGeneric;

    type L = FloatGeneric<f64>;

    let array = &[ // column-major
        1., 2.,
        3., 4.,
        5., 6.,
    ];
    let x = &mut[0.; 3];
    let y = &mut[0.; 2];
    let u = &[1., -1.];
    let v = &mut[0.; 3];

    let m = MatOp::<L>::new((2, 3), array);
    assert_eq!(m.size(), (2, 3));

    for i in 0.. x.len() {
        x[i] = 1.;
        m.op(1., x, 0., y);
        assert_float_eq!(y.as_ref(), array[i * 2 .. i * 2 + 2].as_ref(), abs_all <= 1e-12);
        x[i] = 0.;
    }

    m.trans_op(1., u, 0., v);
    assert_float_eq!(v.as_ref(), [-1., -1., -1.].as_ref(), abs_all <= 1e-12);
}
