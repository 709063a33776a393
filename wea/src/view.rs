//! ndarray views over exchange payloads
//!
//! Payloads are column-major, so views are built with Fortran strides.

use crate::error::{Error, Result};
use crate::handle::ExchangeHandle;
use ndarray::{ArrayBase, ArrayD, ArrayViewD, ArrayViewMutD, Data, Dimension, IxDyn, ShapeBuilder};
use wea_core::{ExchangeElement, SegmentStorage, SegmentStorageMut};

impl<S: SegmentStorage> ExchangeHandle<S> {
    /// Read-only array view of the payload
    pub fn view<T: ExchangeElement>(&self) -> Result<ArrayViewD<'_, T>> {
        let data = self.as_slice::<T>()?;
        ArrayViewD::from_shape(IxDyn(self.shape()).f(), data).map_err(|_| Error::ShapeMismatch)
    }

    /// Copy the payload into an owned array
    pub fn to_owned_array<T: ExchangeElement>(&self) -> Result<ArrayD<T>> {
        Ok(self.view::<T>()?.to_owned())
    }
}

impl<S: SegmentStorageMut> ExchangeHandle<S> {
    /// Mutable array view of the payload
    pub fn view_mut<T: ExchangeElement>(&mut self) -> Result<ArrayViewMutD<'_, T>> {
        let dim = IxDyn(self.shape()).f();
        let data = self.as_slice_mut::<T>()?;
        ArrayViewMutD::from_shape(dim, data).map_err(|_| Error::ShapeMismatch)
    }

    /// Copy `source` into the payload; shapes must match exactly
    pub fn assign_from<T, Sd, D>(&mut self, source: &ArrayBase<Sd, D>) -> Result<()>
    where
        T: ExchangeElement,
        Sd: Data<Elem = T>,
        D: Dimension,
    {
        if source.shape() != self.shape() {
            return Err(Error::ShapeMismatch);
        }
        self.view_mut::<T>()?.assign(&source.view().into_dyn());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};
    use wea_core::{segment_size, ElementType};

    fn handle(ty: ElementType, shape: &[usize]) -> ExchangeHandle<Vec<u8>> {
        let (total, _, _) = segment_size(shape, ty).unwrap();
        ExchangeHandle::create_in(vec![0u8; total], ty, shape).unwrap()
    }

    #[test]
    fn test_view_is_column_major() {
        let mut h = handle(ElementType::Int8, &[2, 3]);
        h.as_slice_mut::<i8>()
            .unwrap()
            .copy_from_slice(&[1, 2, 3, 4, 5, 6]);

        let view = h.view::<i8>().unwrap();
        assert_eq!(view.shape(), &[2, 3]);
        // first dimension varies fastest
        assert_eq!(view[[0, 0]], 1);
        assert_eq!(view[[1, 0]], 2);
        assert_eq!(view[[0, 1]], 3);
        assert_eq!(view[[1, 2]], 6);
    }

    #[test]
    fn test_assign_from_row_major_source() {
        let mut h = handle(ElementType::UInt8, &[2, 3]);
        let source = array![[1u8, 2, 3], [4, 5, 6]];
        h.assign_from(&source).unwrap();

        assert_eq!(h.as_slice::<u8>().unwrap(), &[1, 4, 2, 5, 3, 6]);
        assert_eq!(h.to_owned_array::<u8>().unwrap(), source.into_dyn());
    }

    #[test]
    fn test_assign_from_wrong_shape() {
        let mut h = handle(ElementType::UInt8, &[2, 3]);
        let source = Array3::<u8>::zeros((2, 3, 1));
        assert!(matches!(h.assign_from(&source), Err(Error::ShapeMismatch)));
    }

    #[test]
    fn test_view_mut_writes_through() {
        let mut h = handle(ElementType::Int8, &[4]);
        h.view_mut::<i8>().unwrap().fill(-7);
        assert_eq!(h.as_slice::<i8>().unwrap(), &[-7, -7, -7, -7]);
    }

    #[test]
    fn test_scalar_view() {
        let mut h = handle(ElementType::UInt8, &[]);
        h.payload_mut()[0] = 42;
        let view = h.view::<u8>().unwrap();
        assert_eq!(view.ndim(), 0);
        assert_eq!(view.iter().copied().collect::<Vec<_>>(), vec![42]);
    }

    #[test]
    fn test_last_element_of_any_shape() {
        let empty = handle(ElementType::UInt8, &[0, 3]);
        assert_eq!(empty.view::<u8>().unwrap().iter().last(), None);

        let mut cube = handle(ElementType::UInt8, &[2, 2, 2]);
        cube.payload_mut()[7] = 9;
        assert_eq!(cube.view::<u8>().unwrap().iter().last(), Some(&9));
    }
}
