//! N-dimensional values read from a netCDF variable.

use crate::error::{NetCdfError, NetCdfResult};

/// Row-major array of values converted to `f64`.
///
/// Fill values are NaN; packed variables are already unpacked with their
/// `scale_factor` and `add_offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct NcArray {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl NcArray {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> NetCdfResult<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(NetCdfError::InvalidFormat(format!(
                "shape {:?} holds {} values, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Take the sub-array at `index` along the leading axis.
    pub fn index_leading(&self, index: usize, what: &str) -> NetCdfResult<NcArray> {
        let Some((&len, rest)) = self.shape.split_first() else {
            return Err(NetCdfError::InvalidFormat(format!("cannot select {} of a scalar", what)));
        };
        if index >= len {
            return Err(NetCdfError::Selection {
                what: what.to_string(),
                index,
                len,
            });
        }
        let stride: usize = rest.iter().product();
        let start = index * stride;
        Ok(NcArray {
            shape: rest.to_vec(),
            data: self.data[start..start + stride].to_vec(),
        })
    }

    /// Drop all length-one dimensions.
    pub fn squeeze(mut self) -> Self {
        self.shape.retain(|&n| n != 1);
        self
    }

    /// Values as `i32`, for integer variables such as observation types.
    pub fn to_i32(&self) -> Vec<i32> {
        self.data
            .iter()
            .map(|v| if v.is_finite() { v.round() as i32 } else { i32::MIN })
            .collect()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

/// Which part of a variable to read.
///
/// `ftime` and `flevel` of `None` select every time or level. When both
/// are set the variable is indexed as `[ftime, flevel, ...]`; a lone
/// `flevel` indexes the leading dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VarSelect {
    /// Read the whole variable and ignore `ftime` / `flevel`
    pub one_d: bool,
    pub ftime: Option<usize>,
    pub flevel: Option<usize>,
}

impl VarSelect {
    /// Whole variable.
    pub fn all() -> Self {
        Self {
            one_d: true,
            ..Self::default()
        }
    }

    pub fn time(ftime: usize) -> Self {
        Self {
            ftime: Some(ftime),
            ..Self::default()
        }
    }

    pub fn time_level(ftime: usize, flevel: usize) -> Self {
        Self {
            one_d: false,
            ftime: Some(ftime),
            flevel: Some(flevel),
        }
    }

    /// Convert the `-1 = all` convention used by command-line tools.
    pub fn from_indices(one_d: bool, ftime: i64, flevel: i64) -> Self {
        Self {
            one_d,
            ftime: usize::try_from(ftime).ok(),
            flevel: usize::try_from(flevel).ok(),
        }
    }

    /// Apply the selection and squeeze singleton dimensions.
    pub fn apply(&self, array: NcArray) -> NetCdfResult<NcArray> {
        if self.one_d {
            return Ok(array.squeeze());
        }
        let mut out = array;
        if let Some(t) = self.ftime {
            out = out.index_leading(t, "time")?;
        }
        if let Some(l) = self.flevel {
            out = out.index_leading(l, "level")?;
        }
        Ok(out.squeeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> NcArray {
        // [time=2, level=3, y=1, x=2]
        NcArray::new(vec![2, 3, 1, 2], (0..12).map(f64::from).collect()).unwrap()
    }

    #[test]
    fn test_shape_must_match_data() {
        assert!(NcArray::new(vec![2, 2], vec![1.0; 3]).is_err());
    }

    #[test]
    fn test_all_squeezes() {
        let out = VarSelect::default().apply(cube()).unwrap();
        assert_eq!(out.shape, vec![2, 3, 2]);
        assert_eq!(out.len(), 12);
    }

    #[test]
    fn test_time_and_level() {
        let out = VarSelect::time_level(1, 2).apply(cube()).unwrap();
        assert_eq!(out.shape, vec![2]);
        assert_eq!(out.data, vec![10.0, 11.0]);
    }

    #[test]
    fn test_time_only() {
        let out = VarSelect::time(0).apply(cube()).unwrap();
        assert_eq!(out.shape, vec![3, 2]);
        assert_eq!(out.data[..2], [0.0, 1.0]);
    }

    #[test]
    fn test_level_without_time_indexes_leading_axis() {
        let level = NcArray::new(vec![3, 2], (0..6).map(f64::from).collect()).unwrap();
        let out = VarSelect::from_indices(false, -1, 1).apply(level).unwrap();
        assert_eq!(out.data, vec![2.0, 3.0]);
    }

    #[test]
    fn test_out_of_range() {
        let err = VarSelect::time(5).apply(cube()).unwrap_err();
        assert!(matches!(err, NetCdfError::Selection { index: 5, len: 2, .. }));
    }

    #[test]
    fn test_one_d_ignores_indices() {
        let v = NcArray::new(vec![4], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let sel = VarSelect::from_indices(true, 3, 3);
        assert_eq!(sel.apply(v.clone()).unwrap(), v);
    }

    #[test]
    fn test_to_i32() {
        let v = NcArray::new(vec![3], vec![187.0, 287.0000001, f64::NAN]).unwrap();
        assert_eq!(v.to_i32(), vec![187, 287, i32::MIN]);
    }
}
