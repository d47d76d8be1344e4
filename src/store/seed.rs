//! Built-in data used when nothing usable is persisted.

use crate::domain::{NewTestCase, Priority, TestCase};

/// A single example test case so a fresh install is not empty.
pub fn seed_test_cases() -> Vec<TestCase> {
    vec![TestCase::create(
        NewTestCase::new("TC-CHECKOUT-CC-01", "User completes purchase with valid credit card")
            .with_description(
                "Verify that registered users can successfully complete purchases using valid credit card \
                 payment, receive order confirmation, and see order in purchase history.",
            )
            .with_preconditions(
                "User account exists with username \"test@example.com\"\n\
                 Shopping cart contains at least one product\n\
                 Payment gateway configured for test transactions\n\
                 Test environment accessible and running",
            )
            .with_test_data(
                "Username: test@example.com\nPassword: TestPass123\nCredit Card: 4111 1111 1111 1111\n\
                 Expiry: 12/25\nCVV: 123",
            )
            .with_priority(Priority::High)
            .with_related_requirements("US-123, AC-456")
            .with_step(
                "Navigate to login page",
                "Login page loads with username and password fields visible",
            )
            .with_step(
                "Enter username \"test@example.com\" and password \"TestPass123\"",
                "Credentials entered",
            )
            .with_step("Click \"Login\" button", "Dashboard displays welcome message")
            .with_step("Navigate to cart and click \"Checkout\"", "Checkout page loads")
            .with_step(
                "Enter valid credit card details and submit",
                "Order confirmation page displays with order number",
            ),
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TestStatus;

    #[test]
    fn test_seed_has_one_untested_case() {
        let cases = seed_test_cases();
        assert_eq!(cases.len(), 1);
        let case = &cases[0];
        assert_eq!(case.steps.len(), 5);
        assert_eq!(case.qa_status, TestStatus::Untested);
        assert_eq!(case.test_suite_id, None);
    }
}
