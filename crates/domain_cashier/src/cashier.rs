//! Cashier-specific service operations
//!
//! Item and bill lookups built on the generic data service by composing
//! criteria predicates.

use core_kernel::{Criteria, DataError, DepartmentId, PagingInfo, Predicate, NAME_FIELD};
use tracing::{info, instrument, warn};

use crate::bill::{Bill, RECEIPT_NUMBER_FIELD};
use crate::item::{Item, DEPARTMENT_ID_FIELD};
use crate::service::{validate_name_fragment, DataService};

impl DataService<Item> {
    /// Returns the items of a department
    pub async fn get_items_by_department(
        &self,
        department_id: DepartmentId,
        include_voided: bool,
        paging: Option<&mut PagingInfo>,
    ) -> Result<Vec<Item>, DataError> {
        let criteria = Self::voided_filter(include_voided)
            .add(Predicate::eq(DEPARTMENT_ID_FIELD, department_id));
        self.execute(criteria, paging).await
    }

    /// Finds items whose name starts with the fragment, optionally within one
    /// department
    ///
    /// # Errors
    ///
    /// `InvalidArgument` under the same rules as `find_by_name`
    pub async fn find_items(
        &self,
        department_id: Option<DepartmentId>,
        name_fragment: Option<&str>,
        include_voided: bool,
        paging: Option<&mut PagingInfo>,
    ) -> Result<Vec<Item>, DataError> {
        let fragment = validate_name_fragment("name_fragment", name_fragment)?;
        let mut criteria = Self::voided_filter(include_voided)
            .add(Predicate::starts_with_ignore_case(NAME_FIELD, fragment));
        if let Some(department_id) = department_id {
            criteria = criteria.add(Predicate::eq(DEPARTMENT_ID_FIELD, department_id));
        }
        self.execute(criteria, paging).await
    }
}

impl DataService<Bill> {
    /// Fetches the bill with the given receipt number
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the receipt number is absent, empty or too long;
    /// `NotFound` if no bill has it; `AmbiguousResult` if several do
    #[instrument(skip(self))]
    pub async fn get_bill_by_receipt_number(
        &self,
        receipt_number: Option<&str>,
    ) -> Result<Bill, DataError> {
        let receipt_number = validate_name_fragment("receipt_number", receipt_number)?;
        let criteria = Criteria::new().add(Predicate::eq(RECEIPT_NUMBER_FIELD, receipt_number));

        self.repository().select_one(&criteria).await.inspect_err(|e| {
            if e.is_ambiguous() {
                warn!(receipt_number, "receipt number is not unique");
            }
        })
    }

    /// Replaces a bill with a correcting bill
    ///
    /// Saves the original as `Adjusted` and the new pending bill in one unit of
    /// work, so a failed write leaves neither change behind. Returns the new
    /// bill.
    ///
    /// # Errors
    ///
    /// `NullReference` if no bill is supplied; `InvalidArgument` if the receipt
    /// number is invalid or the bill cannot be adjusted
    #[instrument(skip_all)]
    pub async fn adjust_bill(
        &self,
        bill: Option<Bill>,
        receipt_number: Option<&str>,
    ) -> Result<Bill, DataError> {
        let mut original = bill.ok_or_else(|| DataError::null_reference("bill"))?;
        let receipt_number = validate_name_fragment("receipt_number", receipt_number)?;

        let replacement = original.adjust_with(receipt_number)?;
        let saved = self
            .repository()
            .save_all(vec![original, replacement])
            .await?;
        let [original, replacement]: [Bill; 2] = saved.try_into().map_err(|_| {
            DataError::storage_message(
                "An error occurred while attempting to adjust a Bill entity: the store returned an unexpected number of bills.",
            )
        })?;

        info!(
            original = ?original.id,
            replacement = ?replacement.id,
            "bill adjusted"
        );
        Ok(replacement)
    }
}
