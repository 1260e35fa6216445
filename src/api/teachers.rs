use super::{not_found, ApiClient, Method};
use crate::error::Result;
use crate::models::{GenerateTeacherPay, Teacher, TeacherInput, TeacherPayment, TeacherPaymentInput};

const TEACHERS: &str = "/api/teacher/";
const PAYMENTS: &str = "/api/teacherpay/";
const GENERATED_PAYMENTS: &str = "/api/genteacherpay/";

impl ApiClient {
    pub fn list_teachers(&self) -> Result<Vec<Teacher>> {
        self.get_json(TEACHERS)
    }

    pub fn get_teacher(&self, id: i64) -> Result<Teacher> {
        not_found(self.get_json(&format!("{TEACHERS}{id}/")), "Teacher", id)
    }

    pub fn create_teacher(&self, input: &TeacherInput) -> Result<Teacher> {
        self.send_multipart(Method::Post, TEACHERS, input.to_form()?)
    }

    pub fn update_teacher(&self, id: i64, input: &TeacherInput) -> Result<Teacher> {
        not_found(
            self.send_multipart(Method::Put, &format!("{TEACHERS}{id}/"), input.to_form()?),
            "Teacher",
            id,
        )
    }

    pub fn delete_teacher(&self, id: i64) -> Result<()> {
        not_found(self.delete(&format!("{TEACHERS}{id}/")), "Teacher", id)
    }

    pub fn list_teacher_payments(&self) -> Result<Vec<TeacherPayment>> {
        self.get_json(PAYMENTS)
    }

    pub fn get_teacher_payment(&self, id: i64) -> Result<TeacherPayment> {
        not_found(self.get_json(&format!("{PAYMENTS}{id}/")), "Payment", id)
    }

    pub fn create_teacher_payment(&self, input: &TeacherPaymentInput) -> Result<TeacherPayment> {
        self.send_json(Method::Post, PAYMENTS, input)
    }

    pub fn update_teacher_payment(
        &self,
        id: i64,
        input: &TeacherPaymentInput,
    ) -> Result<TeacherPayment> {
        not_found(
            self.send_json(Method::Put, &format!("{PAYMENTS}{id}/"), input),
            "Payment",
            id,
        )
    }

    pub fn delete_teacher_payment(&self, id: i64) -> Result<()> {
        not_found(self.delete(&format!("{PAYMENTS}{id}/")), "Payment", id)
    }

    /// Creates one payment row per enrolled teacher for the month.
    pub fn generate_teacher_payments(&self, request: &GenerateTeacherPay) -> Result<()> {
        let _: serde_json::Value = self.send_json(Method::Post, GENERATED_PAYMENTS, request)?;
        Ok(())
    }
}
