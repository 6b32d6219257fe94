use std::ops::{Index, IndexMut};
use num_traits::{Float, Zero};
use crate::solver::{SliceLike, Operator};
use crate::{LinAlgEx, MatOp};

//

/// Matrix builder
/// 
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-svg.js"></script>
/// 
/// Dense matrix struct which owns a `Vec` of column-major data array.
/// It is convertible to [`MatOp`] and also implements [`Operator`] by itself,
/// so that it can be a block of [`crate::BlockOp`].
#[derive(Debug, Clone)]
pub struct MatBuild<L: LinAlgEx>
{
    n_row: usize,
    n_col: usize,
    array: Vec<L::F>,
}

impl<L: LinAlgEx> MatBuild<L>
{
    /// Creates an instance.
    /// 
    /// Returns the [`MatBuild`] instance with zero data.
    /// * `(n_row, n_col)` is a number of rows and columns.
    pub fn new((n_row, n_col): (usize, usize)) -> Self
    {
        MatBuild {
            n_row,
            n_col,
            array: vec![L::F::zero(); n_row * n_col],
        }
    }

    /// Size of the matrix.
    /// 
    /// Returns a tuple of a number of rows and columns.
    pub fn size(&self) -> (usize, usize)
    {
        (self.n_row, self.n_col)
    }

    /// Converted as [`MatOp`].
    /// 
    /// Returns the [`MatOp`] borrowing the internal data array.
    pub fn as_op(&self) -> MatOp<'_, L>
    {
        MatOp::new(self.size(), &self.array)
    }

    /// Data by a function.
    /// 
    /// * `func` takes a row and a column of the matrix and returns data of each element.
    pub fn set_by_fn<M>(&mut self, mut func: M)
    where M: FnMut(usize, usize) -> L::F
    {
        for c in 0.. self.n_col {
            for r in 0.. self.n_row {
                self[(r, c)] = func(r, c);
            }
        }
    }
    /// Builder pattern of [`MatBuild::set_by_fn`].
    pub fn by_fn<M>(mut self, func: M) -> Self
    where M: FnMut(usize, usize) -> L::F
    {
        self.set_by_fn(func);
        self
    }

    /// Data by an iterator in row-major.
    /// 
    /// * `iter` iterates matrix data in row-major.
    pub fn set_iter_rowmaj<T>(&mut self, iter: T)
    where T: IntoIterator<Item=L::F>
    {
        let mut i = iter.into_iter();

        for r in 0.. self.n_row {
            for c in 0.. self.n_col {
                if let Some(v) = i.next() {
                    self[(r, c)] = v;
                }
                else {
                    break;
                }
            }
        }
    }
    /// Builder pattern of [`MatBuild::set_iter_rowmaj`].
    pub fn iter_rowmaj<T>(mut self, iter: T) -> Self
    where T: IntoIterator<Item=L::F>
    {
        self.set_iter_rowmaj(iter);
        self
    }

    /// Scales by \\(\alpha\\).
    /// 
    /// * `alpha` is a scalar \\(\alpha\\).
    pub fn set_scale(&mut self, alpha: L::F)
    {
        L::scale(alpha, &mut L::Sl::new_mut(&mut self.array));
    }
    /// Builder pattern of [`MatBuild::set_scale`].
    pub fn scale(mut self, alpha: L::F) -> Self
    {
        self.set_scale(alpha);
        self
    }

    /// Scales each row \\(r\\) by \\(d_r\\), that is \\(G \rightarrow {\bf diag}(d) G\\).
    /// 
    /// * `d` shall have the length of the number of rows.
    pub fn set_scale_rows(&mut self, d: &[L::F])
    {
        assert_eq!(d.len(), self.n_row);

        for c in 0.. self.n_col {
            for r in 0.. self.n_row {
                self[(r, c)] = d[r] * self[(r, c)];
            }
        }
    }
    /// Builder pattern of [`MatBuild::set_scale_rows`].
    pub fn scale_rows(mut self, d: &[L::F]) -> Self
    {
        self.set_scale_rows(d);
        self
    }

    fn index(&self, (r, c): (usize, usize)) -> usize
    {
        assert!(r < self.n_row);
        assert!(c < self.n_col);

        c * self.n_row + r
    }
}

//

impl<L: LinAlgEx> Index<(usize, usize)> for MatBuild<L>
{
    type Output = L::F;
    fn index(&self, index: (usize, usize)) -> &Self::Output
    {
        let i = self.index(index);

        &self.array[i]
    }
}

impl<L: LinAlgEx> IndexMut<(usize, usize)> for MatBuild<L>
{
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output
    {
        let i = self.index(index);

        &mut self.array[i]
    }
}

impl<L: LinAlgEx> Operator<L> for MatBuild<L>
{
    fn size(&self) -> (usize, usize)
    {
        MatBuild::size(self)
    }

    fn op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        self.as_op().op(alpha, x, beta, y);
    }

    fn trans_op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        self.as_op().trans_op(alpha, x, beta, y);
    }
}

impl<L: LinAlgEx> AsRef<[L::F]> for MatBuild<L>
{
    fn as_ref(&self) -> &[L::F]
    {
        &self.array
    }
}

//

impl<L: LinAlgEx> core::fmt::Display for MatBuild<L>
where L::F: Float + core::fmt::LowerExp
{
    fn fmt(&self, f: &mut core::fmt::Formatter) -> Result<(), core::fmt::Error>
    {
        let (nr, nc) = self.size();
        if nr == 0 || nc == 0 {
            write!(f, "[ ]")?;
        }
        else {
            write!(f, "[ {:.3e}", self[(0, 0)])?;
            if nc > 2 {
                write!(f, " ...")?;
            }
            if nc > 1 {
                write!(f, " {:.3e}", self[(0, nc - 1)])?;
            }

            if nr > 2 {
                writeln!(f)?;
                write!(f, "  ...")?;
            }

            if nr > 1 {
                writeln!(f)?;
                write!(f, "  {:.3e}", self[(nr - 1, 0)])?;
                if nc > 2 {
                    write!(f, " ...")?;
                }
                if nc > 1 {
                    write!(f, " {:.3e}", self[(nr - 1, nc - 1)])?;
                }
            }
            write!(f, " ]")?;
        }

        write!(f, " ({} x {})", nr, nc)
    }
}

//

#[test]
fn test_matbuild1()
{
    use float_eq::assert_float_eq;
    use crate::FloatGeneric;

    type L = FloatGeneric<f64>;

    let m = MatBuild::<L>::new((2, 3))
            .iter_rowmaj([
                1., 2., 3.,
                4., 5., 6.,
            ])
            .scale_rows(&[1., 10.]);

    let m_array: &[f64] = m.as_ref();
    assert_float_eq!(m_array, [1., 40., 2., 50., 3., 60.].as_ref(), abs_all <= 1e-12);

    let y = &mut[0.; 2];
    m.op(1., &[1., 0., -1.], 0., y);
    assert_float_eq!(y.as_ref(), [-2., -20.].as_ref(), abs_all <= 1e-12);
}
