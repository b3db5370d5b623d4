mod ledger_calculator_tests;
